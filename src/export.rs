//! A single listing-to-ncdu export run

use std::io::Write;

use tracing::{info, warn};

use crate::error::{Result, SourceError};
use crate::ncdu::{Metadata, NcduWriter};
use crate::source::ObjectEntry;
use crate::tree::{PathWalker, WalkStats, WalkerConfig};

/// Settings for one export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Name of the synthesized top-level directory, usually the bucket.
    pub root_name: String,
    pub progname: String,
    pub progver: String,
    pub walker: WalkerConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            root_name: "/".to_string(),
            progname: env!("CARGO_PKG_NAME").to_string(),
            progver: env!("CARGO_PKG_VERSION").to_string(),
            walker: WalkerConfig::default(),
        }
    }
}

/// Outcome of a successful export.
#[derive(Debug)]
pub struct ExportSummary<W> {
    pub stats: WalkStats,
    /// The sink, flushed and holding the complete document.
    pub sink: W,
}

/// Stream `entries` into `sink` as an ncdu document stamped with the current time.
pub fn export<I, W>(entries: I, sink: W, config: &ExportConfig) -> Result<ExportSummary<W>>
where
    I: IntoIterator<Item = std::result::Result<ObjectEntry, SourceError>>,
    W: Write,
{
    let metadata = Metadata::new(&config.progname, &config.progver);
    export_with_metadata(entries, sink, config, &metadata)
}

/// Like [`export`], with caller-supplied document metadata.
///
/// On error the partial document is still closed: every directory opened so
/// far is terminated before the error is returned.
pub fn export_with_metadata<I, W>(
    entries: I,
    sink: W,
    config: &ExportConfig,
    metadata: &Metadata,
) -> Result<ExportSummary<W>>
where
    I: IntoIterator<Item = std::result::Result<ObjectEntry, SourceError>>,
    W: Write,
{
    info!(root = %config.root_name, "starting export");

    let mut writer = NcduWriter::new(sink, &config.root_name, metadata)?;
    let mut walker = PathWalker::new(config.walker.clone());

    let stats = match walker.walk(entries, &mut writer) {
        Ok(stats) => stats,
        Err(e) => {
            warn!(
                error = %e,
                objects = walker.stats().objects,
                depth = writer.depth(),
                "export aborted, closing partial document"
            );
            // dropping the writer balances the document
            return Err(e);
        }
    };
    let sink = writer.finish()?;

    info!(
        objects = stats.objects,
        files = stats.files,
        directories = stats.directories,
        bytes = stats.bytes,
        "export finished"
    );
    Ok(ExportSummary { stats, sink })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::test_utils::{entries, expected_mapping, reconstruct};
    use crate::tree::OrderCheck;

    fn metadata() -> Metadata {
        Metadata {
            progname: "ncdu-bos".to_string(),
            progver: "0.1".to_string(),
            timestamp: 1700000000,
        }
    }

    fn config(root: &str) -> ExportConfig {
        ExportConfig {
            root_name: root.to_string(),
            ..Default::default()
        }
    }

    fn run(items: &[(&str, u64)]) -> String {
        let summary =
            export_with_metadata(entries(items), Vec::new(), &config("bucket"), &metadata())
                .unwrap();
        String::from_utf8(summary.sink).unwrap()
    }

    #[test]
    fn test_reference_document() {
        let out = run(&[("a/b/file1", 10), ("a/b/file2", 20), ("a/c/file3", 5)]);
        let expected = concat!(
            r#"[1,0,{"progname":"ncdu-bos","progver":"0.1","timestamp":1700000000},"#,
            "\n",
            r#"[{"name":"bucket"},"#,
            "\n",
            r#"[{"name":"a"},"#,
            "\n",
            r#"[{"name":"b"},"#,
            "\n",
            r#"{"name":"file1","dsize":10},"#,
            "\n",
            r#"{"name":"file2","dsize":20}],"#,
            "\n",
            r#"[{"name":"c"},"#,
            "\n",
            r#"{"name":"file3","dsize":5}]]]]"#,
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn test_empty_listing_has_only_root() {
        let out = run(&[]);
        let doc: serde_json::Value = serde_json::from_str(&out).unwrap();
        let top = doc.as_array().unwrap();
        assert_eq!(top.len(), 4);
        assert_eq!(top[2]["progname"], "ncdu-bos");
        assert_eq!(top[3], serde_json::json!([{"name": "bucket"}]));
    }

    #[test]
    fn test_marker_only_listing() {
        let out = run(&[("x/", 0)]);
        let doc: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc[3], serde_json::json!([{"name": "bucket"}, [{"name": "x"}]]));
    }

    #[test]
    fn test_round_trip() {
        let items = [
            ("", 0),
            ("/abs", 1),
            ("a b/c\"d/e\\f", 2),
            ("a b/c\"d/g", 3),
            ("a//x", 4),
            ("a/b/", 0),
            ("a/b/c", 5),
            ("a/b/d/e/f/g/h", 6),
            ("a/z", 7),
            ("dir/", 0),
            ("dir/sub/", 0),
            ("top", 8),
            ("\u{7c7b}/\u{6587}\u{4ef6}", 9),
        ];
        let out = run(&items);
        let doc: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(reconstruct(&doc).unwrap(), expected_mapping(&items));
    }

    #[test]
    fn test_empty_root_name_uses_placeholder() {
        let summary =
            export_with_metadata(entries(&[]), Vec::new(), &config(""), &metadata()).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&summary.sink).unwrap();
        assert_eq!(doc[3][0]["name"], crate::ncdu::EMPTY_NAME);
    }

    #[test]
    fn test_unsorted_listing_fails_with_balanced_output() {
        let mut buf = Vec::new();
        let err = export_with_metadata(
            entries(&[("m/n/o", 1), ("m/p", 2), ("a", 3)]),
            &mut buf,
            &config("bucket"),
            &metadata(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Unordered { .. }));

        let doc: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let partial = reconstruct(&doc).unwrap();
        assert_eq!(partial.len(), 2);
        assert_eq!(partial["m/p"], 2);
    }

    #[test]
    fn test_source_error_fails_with_balanced_output() {
        let mut buf = Vec::new();
        let mut items = entries(&[("a/b/c", 1)]);
        items.push(Err(SourceError::StalledPagination));
        let err = export_with_metadata(items, &mut buf, &config("bucket"), &metadata())
            .unwrap_err();
        assert!(matches!(err, Error::Source(_)));
        let doc: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(reconstruct(&doc).unwrap().len(), 1);
    }

    #[test]
    fn test_trusted_unsorted_listing_still_parses() {
        let mut cfg = config("bucket");
        cfg.walker.order_check = OrderCheck::Trust;
        let summary = export_with_metadata(
            entries(&[("z/1", 1), ("a/1", 1), ("z/2", 1)]),
            Vec::new(),
            &cfg,
            &metadata(),
        )
        .unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&summary.sink).unwrap();
        // z appears twice: the tree is valid but not merged
        let root = doc[3].as_array().unwrap();
        assert_eq!(root.len(), 4);
        assert_eq!(summary.stats.files, 3);
    }

    #[test]
    fn test_export_stamps_current_time() {
        let before = chrono::Utc::now().timestamp();
        let summary = export(entries(&[("f", 1)]), Vec::new(), &config("b")).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&summary.sink).unwrap();
        assert!(doc[2]["timestamp"].as_i64().unwrap() >= before);
        assert_eq!(doc[2]["progname"], env!("CARGO_PKG_NAME"));
    }
}
