pub mod manifest_annotator;
