//! Pipeline dispatch and error surfaces, using backends that count their calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use docfill_core::{BackendError, OcrBackend, PdfBackend};
use docfill_ingest::{DocumentPipeline, DocumentType, ExtractionError, RawDocument};
use docfill_parsing::FieldMapper;

const PAN_TEXT: &str = "\
INCOME TAX DEPARTMENT
Name : ASHA VERMA
Date of Birth : 02/03/1990
Permanent Account Number : BQKPV4821L
";

const GST_TEXT: &str = "\
Registration Number : 24AAACB5678C1ZQ
1. Legal Name of Business : BHARAT POLYMERS LIMITED
4. Address of Principal Place of Business : GIDC Estate, Vapi

Annexure B
1 Name HARSH PATEL
Designation/Status Director
Resident of State Gujarat
";

#[derive(Clone)]
struct Counting {
    calls: Arc<AtomicUsize>,
    reply: Result<&'static str, &'static str>,
}

impl Counting {
    fn ok(text: &'static str) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            reply: Ok(text),
        }
    }

    fn failing(message: &'static str) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            reply: Err(message),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond(&self) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            Ok(text) => Ok(text.to_string()),
            Err(message) => Err(BackendError::OpenError(message.to_string())),
        }
    }
}

impl PdfBackend for Counting {
    fn extract_text(&self, _pdf_bytes: &[u8]) -> Result<String, BackendError> {
        self.respond()
    }
}

impl OcrBackend for Counting {
    fn image_to_text(&self, _image_bytes: &[u8], _media_type: &str) -> Result<String, BackendError> {
        self.respond()
    }
}

fn pipeline(pdf: &Counting, ocr: &Counting) -> DocumentPipeline {
    DocumentPipeline::with_backends(Box::new(pdf.clone()), Box::new(ocr.clone()))
}

#[test]
fn pdf_goes_to_pdf_backend() {
    let pdf = Counting::ok(GST_TEXT);
    let ocr = Counting::ok("");
    let out = pipeline(&pdf, &ocr)
        .extract(
            RawDocument::new(b"%PDF-1.7".to_vec(), "application/pdf"),
            DocumentType::GstCertificate,
        )
        .unwrap();

    assert_eq!((pdf.calls(), ocr.calls()), (1, 0));
    assert_eq!(out.text("gst_number"), Some("24AAACB5678C1ZQ"));
    assert_eq!(out.text("state"), Some("Gujarat"));
    assert_eq!(out.text("director_name_0"), Some("HARSH PATEL"));
}

#[test]
fn images_go_to_ocr() {
    let pdf = Counting::ok("");
    let ocr = Counting::ok(PAN_TEXT);
    let p = pipeline(&pdf, &ocr);

    for media_type in ["image/png", "image/jpeg", "IMAGE/TIFF"] {
        let out = p
            .extract(
                RawDocument::new(vec![0u8; 8], media_type),
                DocumentType::PanCard,
            )
            .unwrap();
        assert_eq!(out.text("director_pan_0"), Some("BQKPV4821L"), "{media_type}");
    }
    assert_eq!((pdf.calls(), ocr.calls()), (0, 3));
}

#[test]
fn mapper_slot_applies_to_identity_fields() {
    let pdf = Counting::ok("");
    let ocr = Counting::ok(PAN_TEXT);
    let out = pipeline(&pdf, &ocr)
        .with_mapper(FieldMapper::with_director_slot(1))
        .extract(
            RawDocument::new(vec![0u8; 8], "image/png"),
            DocumentType::PanCard,
        )
        .unwrap();
    assert_eq!(out.text("director_pan_1"), Some("BQKPV4821L"));
    assert!(!out.contains_key("director_pan_0"));
}

#[test]
fn unsupported_format_invokes_no_backend() {
    let pdf = Counting::ok(PAN_TEXT);
    let ocr = Counting::ok(PAN_TEXT);
    let err = pipeline(&pdf, &ocr)
        .extract(
            RawDocument::new(b"hello".to_vec(), "text/plain"),
            DocumentType::PanCard,
        )
        .unwrap_err();

    assert!(matches!(err, ExtractionError::UnsupportedFormat { ref media_type } if media_type == "text/plain"));
    assert_eq!(err.to_string(), "Unsupported file format");
    assert_eq!((pdf.calls(), ocr.calls()), (0, 0));
}

#[test]
fn unknown_document_type_fails_before_acquisition() {
    let pdf = Counting::ok(PAN_TEXT);
    let ocr = Counting::ok(PAN_TEXT);
    let err = pipeline(&pdf, &ocr)
        .extract_labeled(
            RawDocument::new(b"%PDF".to_vec(), "application/pdf"),
            "Sanction Letter",
        )
        .unwrap_err();

    assert_eq!(err.to_string(), "Unsupported document type");
    assert_eq!((pdf.calls(), ocr.calls()), (0, 0));
}

#[test]
fn labels_and_slugs_both_resolve() {
    let pdf = Counting::ok(PAN_TEXT);
    let ocr = Counting::ok("");
    let p = pipeline(&pdf, &ocr);
    for label in ["PAN Card", "pan"] {
        let out = p
            .extract_labeled(RawDocument::new(vec![1], "application/pdf"), label)
            .unwrap();
        assert_eq!(out.text("director_name_0"), Some("ASHA VERMA"), "{label}");
    }
}

#[test]
fn backend_failure_is_acquisition_error() {
    let pdf = Counting::failing("no objects found");
    let ocr = Counting::ok("");
    let err = pipeline(&pdf, &ocr)
        .extract(
            RawDocument::new(b"garbage".to_vec(), "application/pdf"),
            DocumentType::BankStatement,
        )
        .unwrap_err();

    assert!(matches!(err, ExtractionError::Acquisition(BackendError::OpenError(_))));
    assert_eq!(err.to_string(), "Unable to read file");
}

#[test]
fn repeated_runs_are_identical() {
    let pdf = Counting::ok(GST_TEXT);
    let ocr = Counting::ok("");
    let p = pipeline(&pdf, &ocr);
    let doc = || RawDocument::new(vec![0], "application/pdf");
    let first = p.extract(doc(), DocumentType::GstCertificate).unwrap();
    let second = p.extract(doc(), DocumentType::GstCertificate).unwrap();
    assert_eq!(first, second);
}

#[test]
fn extract_raw_keeps_local_names() {
    let pdf = Counting::ok(GST_TEXT);
    let ocr = Counting::ok("");
    let raw = pipeline(&pdf, &ocr)
        .extract_raw(
            RawDocument::new(vec![0], "application/pdf"),
            DocumentType::GstCertificate,
        )
        .unwrap();
    assert_eq!(raw.document_type(), DocumentType::GstCertificate);
    let local = raw.to_field_set();
    assert!(local.contains_key("legal_name"));
    assert!(!local.contains_key("enterprise_name"));
}

#[test]
fn shared_across_threads() {
    let pdf = Counting::ok(PAN_TEXT);
    let ocr = Counting::ok(PAN_TEXT);
    let p = Arc::new(pipeline(&pdf, &ocr));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let p = Arc::clone(&p);
            std::thread::spawn(move || {
                let media = if i % 2 == 0 { "application/pdf" } else { "image/png" };
                p.extract(RawDocument::new(vec![0], media), DocumentType::PanCard)
                    .unwrap()
            })
        })
        .collect();

    for h in handles {
        let out = h.join().unwrap();
        assert_eq!(out.text("director_dob_0"), Some("02/03/1990"));
    }
    assert_eq!((pdf.calls(), ocr.calls()), (2, 2));
}
