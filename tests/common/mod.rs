//! Shared helpers for integration tests: small PDFs built with lopdf.

#![allow(dead_code)]

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// One line of text drawn with `Tj`.
#[derive(Debug, Clone)]
pub struct TextLine {
    pub text: &'static str,
    pub bold: bool,
    pub size: i64,
    /// Baseline in PDF user space (y grows upward)
    pub baseline: i64,
}

pub fn regular(text: &'static str, size: i64, baseline: i64) -> TextLine {
    TextLine {
        text,
        bold: false,
        size,
        baseline,
    }
}

pub fn bold(text: &'static str, size: i64, baseline: i64) -> TextLine {
    TextLine {
        text,
        bold: true,
        size,
        baseline,
    }
}

/// Build a US Letter PDF with one page per entry.
pub fn build_pdf(pages: &[Vec<TextLine>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_font = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold_font = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_font,
            "F2" => bold_font,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = Vec::new();
        for line in lines {
            let font = if line.bold { "F2" } else { "F1" };
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec![font.into(), Object::Integer(line.size)],
            ));
            operations.push(Operation::new(
                "Td",
                vec![Object::Integer(72), Object::Integer(line.baseline)],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(line.text)],
            ));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let encoded = content.encode().expect("encode content");
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("save pdf");
    bytes
}

/// Write a PDF built by [`build_pdf`] to `path`.
pub fn write_pdf(path: &Path, pages: &[Vec<TextLine>]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create pdf dir");
    }
    std::fs::write(path, build_pdf(pages)).expect("write pdf");
}

/// Two-page field guide with a bold title, numbered chapters, an
/// unnumbered bold subheading and a lexicon heading.
pub fn field_guide() -> Vec<Vec<TextLine>> {
    vec![
        vec![
            bold("Field Notes", 24, 740),
            bold("1. Introduction", 16, 690),
            regular("This guide covers the birds of the coastal marsh.", 11, 660),
            regular("Observers should carry binoculars and a notebook.", 11, 646),
            regular("Most species are active in the early morning.", 11, 632),
            bold("Wetland Habitats", 13, 600),
            regular("Reed beds shelter herons and warblers alike.", 11, 570),
            regular("Mudflats attract waders at low tide.", 11, 556),
        ],
        vec![
            bold("2. Field Methods", 16, 740),
            regular("Count birds along fixed transects each week.", 11, 710),
            regular("Record weather and tide with every count.", 11, 696),
            regular("Share the tallies with the regional survey.", 11, 682),
            regular("References", 11, 640),
            regular("Marsh Birds of the North Coast, 2019 edition.", 11, 610),
        ],
    ]
}
