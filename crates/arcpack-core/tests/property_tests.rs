//! Property-based tests for request validation and archive publication.
//!
//! These tests use proptest to generate inputs and check that validation
//! and packaging invariants hold across a wide range of cases.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use arcpack_core::ArchiveConfig;
use arcpack_core::ArchiveFormat;
use arcpack_core::Archiver;
use arcpack_core::NullSink;
use arcpack_core::RawRequest;
use arcpack_core::checksum::md5_hex;
use arcpack_core::request::PathInput;
use arcpack_core::request::ResolvedPaths;
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use tempfile::TempDir;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Each missing list entry yields exactly one list-form error, in order.
    #[test]
    fn prop_one_error_per_missing_path(
        names in prop::collection::btree_set("[a-z]{1,12}", 1..6)
    ) {
        let temp = TempDir::new().expect("failed to create temp dir");
        let paths: Vec<String> = names
            .iter()
            .map(|n| temp.path().join(n).display().to_string())
            .collect();

        let request = RawRequest::new()
            .with_path(paths.clone())
            .with_destination(temp.path().display().to_string())
            .with_filename("out");
        let err = request.validate().unwrap_err();

        let expected: Vec<String> = paths
            .iter()
            .map(|p| format!("path[] '{p}' No such file or directory"))
            .collect();
        prop_assert_eq!(err.validation_errors().unwrap().as_slice(), expected.as_slice());
    }

    /// Any capitalization of a known format name is accepted.
    #[test]
    fn prop_type_is_case_insensitive(
        format in prop::sample::select(vec!["zip", "targz"]),
        mask in prop::collection::vec(any::<bool>(), 5)
    ) {
        let mixed: String = format
            .chars()
            .zip(mask.iter().cycle())
            .map(|(c, upper)| if *upper { c.to_ascii_uppercase() } else { c })
            .collect();
        let parsed: ArchiveFormat = mixed.parse().unwrap();
        prop_assert_eq!(parsed.name(), format);
    }

    /// Unknown format names are rejected with the lowercased name.
    #[test]
    fn prop_unknown_type_rejected(format in "[a-zA-Z0-9]{1,8}") {
        let lower = format.to_ascii_lowercase();
        prop_assume!(lower != "zip" && lower != "targz");

        let err = format.parse::<ArchiveFormat>().unwrap_err();
        prop_assert_eq!(err.to_string(), format!("type '{lower}' not one of zip or targz"));
    }

    /// Text that is not a JSON array is always one literal path.
    #[test]
    fn prop_non_array_text_is_single_path(text in "[^\\[]*") {
        let resolved = PathInput::Text(text.clone()).resolve();
        prop_assert_eq!(resolved, ResolvedPaths::Single(text));
    }

    /// A JSON-encoded list resolves to the same paths as the list itself.
    #[test]
    fn prop_encoded_list_matches_list(
        paths in prop::collection::vec("[ -~]{0,16}", 0..5)
    ) {
        let encoded = serde_json::to_string(&paths).unwrap();
        prop_assert_eq!(
            PathInput::Text(encoded).resolve(),
            PathInput::List(paths).resolve()
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// Archived files round-trip byte for byte and the sidecar holds the
    /// archive digest.
    #[test]
    fn prop_archive_round_trips_contents(
        files in prop::collection::btree_map(
            "[a-z]{1,8}",
            prop::collection::vec(any::<u8>(), 0..2048),
            1..6
        ),
        zip_format in any::<bool>()
    ) {
        let src = TempDir::new().unwrap();
        for (name, data) in &files {
            fs::write(src.path().join(name), data).unwrap();
        }
        let out = TempDir::new().unwrap();
        let staging = TempDir::new().unwrap();
        let format = if zip_format { "zip" } else { "targz" };

        let request = RawRequest::new()
            .with_path(src.path().display().to_string())
            .with_destination(out.path().display().to_string())
            .with_filename("prop")
            .with_format(format);
        let archiver = Archiver::new(ArchiveConfig::default().with_staging_parent(staging.path()));
        let result = archiver.archive(&request, &mut NullSink).unwrap();

        let mut extracted = BTreeMap::new();
        if zip_format {
            let mut archive = zip::ZipArchive::new(fs::File::open(&result.archive_file).unwrap()).unwrap();
            for i in 0..archive.len() {
                let mut entry = archive.by_index(i).unwrap();
                let mut data = Vec::new();
                entry.read_to_end(&mut data).unwrap();
                extracted.insert(entry.name().to_string(), data);
            }
        } else {
            let gz = flate2::read::GzDecoder::new(fs::File::open(&result.archive_file).unwrap());
            let mut archive = tar::Archive::new(gz);
            for entry in archive.entries().unwrap() {
                let mut entry = entry.unwrap();
                let name = entry.path().unwrap().display().to_string();
                let mut data = Vec::new();
                entry.read_to_end(&mut data).unwrap();
                extracted.insert(name, data);
            }
        }

        prop_assert_eq!(extracted, files);
        prop_assert_eq!(
            fs::read_to_string(&result.checksum_file).unwrap(),
            md5_hex(&result.archive_file).unwrap()
        );
        prop_assert_eq!(fs::read_dir(staging.path()).unwrap().count(), 0);
    }
}
