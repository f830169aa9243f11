use lopdf::{Dictionary, Document, Object, Stream};
use pagekit_nup::*;
use std::sync::{Arc, Mutex};

/// Build an in-memory source PDF with `num_pages` pages of the given size.
fn create_test_pdf(num_pages: usize, width: f32, height: f32) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(width),
                    Object::Real(height),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn letter_source(num_pages: usize) -> SourceFile {
    SourceFile::new("input.pdf", create_test_pdf(num_pages, 612.0, 792.0))
}

async fn run(files: Vec<SourceFile>, options: &NUpOptions) -> Result<NUpOutcome> {
    process(files, options, ProgressSink::none(), CancelFlag::new()).await
}

/// Load the artifact back and return the output document.
fn reload(artifact: &NUpArtifact) -> Document {
    Document::load_mem(&artifact.bytes).unwrap()
}

fn page_content_text(doc: &Document, page_number: u32) -> String {
    let page_id = doc.get_pages()[&page_number];
    String::from_utf8(doc.get_page_content(page_id).unwrap()).unwrap()
}

fn count_draws(content: &str) -> usize {
    content.matches(" Do Q").count()
}

#[tokio::test]
async fn test_ten_pages_four_up_yields_three_sheets() {
    let outcome = run(vec![letter_source(10)], &NUpOptions::default())
        .await
        .unwrap();

    let artifact = outcome.into_artifact().expect("complete");
    assert_eq!(artifact.mime, "application/pdf");
    assert_eq!(artifact.filename, "input_4-up.pdf");
    assert_eq!(
        artifact.metadata,
        NUpMetadata {
            original_page_count: 10,
            output_sheet_count: 3,
            pages_per_sheet: 4,
        }
    );

    let output = reload(&artifact);
    assert_eq!(output.get_pages().len(), 3);

    // Sheets 1 and 2 hold four pages, the short final chunk holds two
    assert_eq!(count_draws(&page_content_text(&output, 1)), 4);
    assert_eq!(count_draws(&page_content_text(&output, 2)), 4);
    assert_eq!(count_draws(&page_content_text(&output, 3)), 2);
}

#[tokio::test]
async fn test_final_short_chunk_fills_top_row() {
    let outcome = run(vec![letter_source(10)], &NUpOptions::default())
        .await
        .unwrap();
    let artifact = outcome.into_artifact().unwrap();
    let output = reload(&artifact);

    // The two pages of sheet 3 land at grid (0,0) and (0,1): both /P0 and
    // /P1 are placed, both at the top row's y coordinate.
    let content = page_content_text(&output, 3);
    assert!(content.contains("/P0 Do"));
    assert!(content.contains("/P1 Do"));
    assert!(!content.contains("/P2 Do"));

    let options = NUpOptions::default();
    let geometry =
        layout::resolve_sheet_geometry(&options, (612.0, 792.0)).unwrap();
    let grid = layout::Grid::of(options.pages_per_sheet);
    let left = layout::place_in_cell(&geometry, &grid, 0, 612.0, 792.0);
    let right = layout::place_in_cell(&geometry, &grid, 1, 612.0, 792.0);
    assert_eq!(left.y, right.y);
    assert!(right.x > left.x);
    // Top row: above the sheet's vertical midpoint
    assert!(left.y > geometry.page_height / 2.0 - geometry.cell_height);
}

#[tokio::test]
async fn test_nine_pages_nine_up_fills_one_sheet() {
    let options = NUpOptions {
        pages_per_sheet: PagesPerSheet::Nine,
        ..Default::default()
    };
    let outcome = run(vec![letter_source(9)], &options).await.unwrap();
    let artifact = outcome.into_artifact().unwrap();
    assert_eq!(artifact.metadata.output_sheet_count, 1);
    assert_eq!(artifact.filename, "input_9-up.pdf");

    let output = reload(&artifact);
    assert_eq!(output.get_pages().len(), 1);

    // All nine cells are filled, none empty
    let content = page_content_text(&output, 1);
    assert_eq!(count_draws(&content), 9);
    for slot in 0..9 {
        assert!(content.contains(&format!("/P{slot} Do")), "missing slot {slot}");
    }
}

#[tokio::test]
async fn test_output_sheet_is_a4_portrait_by_default() {
    let outcome = run(vec![letter_source(4)], &NUpOptions::default())
        .await
        .unwrap();
    let output = reload(&outcome.into_artifact().unwrap());

    let page_id = output.get_pages()[&1];
    let page = output.get_dictionary(page_id).unwrap();
    let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
    assert_eq!(media_box[2].as_f32().unwrap(), 595.28);
    assert_eq!(media_box[3].as_f32().unwrap(), 841.89);
}

#[tokio::test]
async fn test_auto_orientation_landscape_source_two_up() {
    let source = SourceFile::new("wide.pdf", create_test_pdf(4, 792.0, 612.0));
    let options = NUpOptions {
        pages_per_sheet: PagesPerSheet::Two,
        ..Default::default()
    };
    let outcome = run(vec![source], &options).await.unwrap();
    let output = reload(&outcome.into_artifact().unwrap());

    // 2×1 grid and a landscape first page flips the A4 sheet
    let page_id = output.get_pages()[&1];
    let page = output.get_dictionary(page_id).unwrap();
    let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
    assert_eq!(media_box[2].as_f32().unwrap(), 841.89);
    assert_eq!(media_box[3].as_f32().unwrap(), 595.28);
}

#[tokio::test]
async fn test_border_draws_outline_ops() {
    let options = NUpOptions {
        add_border: true,
        border_color: "#ff0000".to_string(),
        ..Default::default()
    };
    let outcome = run(vec![letter_source(4)], &options).await.unwrap();
    let output = reload(&outcome.into_artifact().unwrap());

    let content = page_content_text(&output, 1);
    assert_eq!(content.matches("re S Q").count(), 4);
    assert!(content.contains("1 0 0 RG"));
    assert!(content.contains("1 w"));
}

#[tokio::test]
async fn test_no_border_by_default() {
    let outcome = run(vec![letter_source(4)], &NUpOptions::default())
        .await
        .unwrap();
    let output = reload(&outcome.into_artifact().unwrap());
    assert!(!page_content_text(&output, 1).contains("re S"));
}

#[tokio::test]
async fn test_two_files_is_invalid_options() {
    let err = run(
        vec![letter_source(2), letter_source(2)],
        &NUpOptions::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidOptions);
}

#[tokio::test]
async fn test_zero_files_is_invalid_options() {
    let err = run(Vec::new(), &NUpOptions::default()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidOptions);
}

#[tokio::test]
async fn test_empty_document_fails() {
    let err = run(vec![letter_source(0)], &NUpOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ProcessingFailed);
}

#[tokio::test]
async fn test_garbage_bytes_fail_processing() {
    let source = SourceFile::new("junk.pdf", b"this is not a pdf".to_vec());
    let err = run(vec![source], &NUpOptions::default()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ProcessingFailed);
}

#[tokio::test]
async fn test_encrypted_source_is_classified() {
    // A trailer carrying an Encrypt dictionary marks the file encrypted,
    // whether or not the engine manages to parse the rest.
    let mut doc = Document::load_mem(&create_test_pdf(3, 612.0, 792.0)).unwrap();
    let mut encrypt = Dictionary::new();
    encrypt.set("Filter", Object::Name(b"Standard".to_vec()));
    encrypt.set("V", Object::Integer(1));
    encrypt.set("R", Object::Integer(2));
    encrypt.set("O", Object::String(vec![0u8; 32], lopdf::StringFormat::Hexadecimal));
    encrypt.set("U", Object::String(vec![0u8; 32], lopdf::StringFormat::Hexadecimal));
    encrypt.set("P", Object::Integer(-44));
    let encrypt_id = doc.add_object(encrypt);
    doc.trailer.set("Encrypt", Object::Reference(encrypt_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();

    let err = run(
        vec![SourceFile::new("locked.pdf", bytes)],
        &NUpOptions::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::SourceEncrypted);
}

#[tokio::test]
async fn test_cancel_before_start_yields_cancelled() {
    let cancel = CancelFlag::new();
    cancel.cancel();

    let outcome = process(
        vec![letter_source(10)],
        &NUpOptions::default(),
        ProgressSink::none(),
        cancel,
    )
    .await
    .unwrap();

    assert!(outcome.is_cancelled());
    assert!(outcome.into_artifact().is_none());
}

#[tokio::test]
async fn test_progress_reaches_completion_monotonically() {
    let reports: Arc<Mutex<Vec<(f32, String)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink_reports = Arc::clone(&reports);
    let progress = ProgressSink::new(move |pct, msg| {
        sink_reports.lock().unwrap().push((pct, msg.to_string()));
    });

    process(
        vec![letter_source(10)],
        &NUpOptions::default(),
        progress,
        CancelFlag::new(),
    )
    .await
    .unwrap();

    let reports = reports.lock().unwrap();
    assert!(!reports.is_empty());
    for pair in reports.windows(2) {
        assert!(pair[1].0 >= pair[0].0, "progress went backwards: {pair:?}");
    }
    assert_eq!(reports.last().unwrap().0, 100.0);
    // One message per sheet during composition
    assert!(reports.iter().any(|(_, m)| m.contains("sheet 1 of 3")));
    assert!(reports.iter().any(|(_, m)| m.contains("sheet 3 of 3")));
    // Composition stays under the serialization milestone
    for (pct, msg) in reports.iter() {
        if msg.contains("Processing sheet") {
            assert!(*pct < 90.0);
        }
    }
}

#[tokio::test]
async fn test_repeat_runs_are_identical() {
    let options = NUpOptions::default();
    let first = run(vec![letter_source(10)], &options)
        .await
        .unwrap()
        .into_artifact()
        .unwrap();
    let second = run(vec![letter_source(10)], &options)
        .await
        .unwrap()
        .into_artifact()
        .unwrap();

    let a = reload(&first);
    let b = reload(&second);
    assert_eq!(a.get_pages().len(), b.get_pages().len());
    for page in 1..=3u32 {
        assert_eq!(page_content_text(&a, page), page_content_text(&b, page));
    }
}

#[tokio::test]
async fn test_sheet_counts_across_grid_sizes() {
    for (pages, n, expected_sheets) in [
        (10usize, PagesPerSheet::Two, 5usize),
        (10, PagesPerSheet::Four, 3),
        (10, PagesPerSheet::Nine, 2),
        (10, PagesPerSheet::Sixteen, 1),
        (16, PagesPerSheet::Sixteen, 1),
        (17, PagesPerSheet::Sixteen, 2),
        (1, PagesPerSheet::Two, 1),
    ] {
        let options = NUpOptions {
            pages_per_sheet: n,
            ..Default::default()
        };
        let artifact = run(vec![letter_source(pages)], &options)
            .await
            .unwrap()
            .into_artifact()
            .unwrap();
        assert_eq!(
            artifact.metadata.output_sheet_count, expected_sheets,
            "{pages} pages at {n:?}"
        );
        assert_eq!(
            reload(&artifact).get_pages().len(),
            expected_sheets,
            "{pages} pages at {n:?}"
        );
    }
}
