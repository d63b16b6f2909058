use std::path::{Path, PathBuf};

use super::*;

#[test]
fn parse_registry_document_keeps_single_header() {
    let text = "Windows Registry Editor Version 5.00\r\n\r\n[HKEY_CURRENT_USER\\Software\\X]\r\n\"a\"=\"1\"\r\n";
    let document = RegistryDocument::parse(text);
    assert_eq!(
        document.lines(),
        [
            REGISTRY_HEADER.to_string(),
            "[HKEY_CURRENT_USER\\Software\\X]".to_string(),
            "\"a\"=\"1\"".to_string(),
        ]
    );
    assert!(document.has_settings());
}

#[test]
fn parse_registry_document_without_header_prepends_it() {
    let document = RegistryDocument::parse("[HKEY_CURRENT_USER\\Software\\X]\n");
    assert_eq!(document.lines()[0], REGISTRY_HEADER);
    assert_eq!(document.body(), ["[HKEY_CURRENT_USER\\Software\\X]".to_string()]);
}

#[test]
fn empty_registry_document_is_header_only() {
    let document = RegistryDocument::parse("");
    assert_eq!(document, RegistryDocument::header_only());
    assert!(!document.has_settings());
}

#[test]
fn blank_body_lines_do_not_count_as_settings() {
    let document = RegistryDocument::from_body(vec![String::new(), "  ".to_string()]);
    assert!(!document.has_settings());
}

#[test]
fn reg_text_uses_crlf_line_endings() {
    let document = RegistryDocument::from_body(vec!["[HKEY_CURRENT_USER\\A]".to_string()]);
    assert_eq!(
        document.to_reg_text(),
        "Windows Registry Editor Version 5.00\r\n[HKEY_CURRENT_USER\\A]\r\n"
    );
}

#[test]
fn encode_registry_text_writes_utf16le_bom() {
    let bytes = encode_registry_text("Ab");
    assert_eq!(bytes, vec![0xff, 0xfe, b'A', 0x00, b'b', 0x00]);
}

#[test]
fn decode_text_bytes_reads_utf16le_export() {
    let bytes = encode_registry_text(
        "Windows Registry Editor Version 5.00\r\n[HKEY_CURRENT_USER\\\u{e9}]\r\n",
    );
    let text = decode_text_bytes(&bytes).expect("must decode");
    assert!(text.starts_with(REGISTRY_HEADER));
    assert!(text.contains('\u{e9}'));
}

#[test]
fn decode_text_bytes_strips_utf8_bom() {
    let text = decode_text_bytes(b"\xef\xbb\xbfSoftware\\X\n").expect("must decode");
    assert_eq!(text, "Software\\X\n");
}

#[test]
fn decode_text_bytes_rejects_truncated_utf16() {
    let err = decode_text_bytes(&[0xff, 0xfe, b'A']).expect_err("odd length must fail");
    assert!(format!("{err:#}").contains("odd byte length"), "unexpected error: {err:#}");
}

#[test]
fn filter_list_ignores_blank_lines_and_trims() {
    let list = FilterList::parse("\\Software\\X\r\n\r\n   \n  \\Software\\Y  \n");
    assert_eq!(list.patterns(), ["\\Software\\X".to_string(), "\\Software\\Y".to_string()]);
    assert_eq!(list.len(), 2);
}

#[test]
fn filter_list_from_empty_source_is_empty() {
    assert!(FilterList::parse("\n\n").is_empty());
}

#[test]
fn filter_list_from_missing_path_reports_path() {
    let err = FilterList::from_path(Path::new("/definitely/not/here.txt"))
        .expect_err("missing source must fail");
    assert!(
        err.to_string().contains("failed to read pattern source"),
        "unexpected error: {err}"
    );
}

#[test]
fn stage_ext_maps_context_chain_into_taxonomy() {
    let result: anyhow::Result<()> =
        Err(anyhow::anyhow!("root cause")).map_err(|err| err.context("outer"));
    let err = result.stage(ErrorStage::Apply).expect_err("must fail");
    assert_eq!(err.stage(), ErrorStage::Apply);
    assert_eq!(err.message(), "outer: root cause");
    assert_eq!(err.to_string(), "apply error: outer: root cause");
}

#[test]
fn site_config_defaults_when_no_path() {
    let config = SiteConfig::load(None).expect("defaults");
    assert_eq!(config, SiteConfig::default());
    assert_eq!(config.registry.target_prefix, "HKEY_CURRENT_USER");
}

#[test]
fn site_config_parses_partial_toml() {
    let config = SiteConfig::from_toml_str(
        r#"
[locator]
managed_root = "users/{user}/profile.v6"

[locator.archive_names]
data = "files.zip"

[registry]
source_prefix = "HKEY_USERS\\Legacy"
"#,
    )
    .expect("config should parse");
    assert_eq!(config.locator.managed_root, "users/{user}/profile.v6");
    assert_eq!(config.locator.archived_root, "archive/{user}");
    assert_eq!(config.locator.archive_names.data, "files.zip");
    assert_eq!(config.locator.archive_names.settings, "settings.zip");
    assert_eq!(config.registry.source_prefix, "HKEY_USERS\\Legacy");
}

#[test]
fn site_config_rejects_parent_dir_template() {
    let err = SiteConfig::from_toml_str("[locator]\narchived_root = \"../{user}\"\n")
        .expect_err("escaping template must fail");
    assert!(
        err.to_string().contains("locator.archived_root must be a relative path"),
        "unexpected error: {err}"
    );
}

#[test]
fn site_config_rejects_empty_importer() {
    let err = SiteConfig::from_toml_str("[registry]\nimporter = \" \"\n")
        .expect_err("empty importer must fail");
    assert!(err.to_string().contains("registry.importer must not be empty"));
}

#[test]
fn locator_templates_expand_user_and_separators() {
    let locator = LocatorConfig {
        managed_root: "profiles\\{user}\\v2".to_string(),
        ..LocatorConfig::default()
    };
    assert_eq!(
        locator.managed_store(Path::new("/share"), "alice"),
        PathBuf::from("/share").join("profiles").join("alice").join("v2")
    );
    assert_eq!(
        locator.archived_store(Path::new("/share"), "alice"),
        PathBuf::from("/share").join("archive").join("alice")
    );
}

#[test]
fn descriptor_stages_return_new_values() {
    let located = ProfileDescriptor::new(
        ProfileType::Managed,
        Path::new("/s/settings.reg"),
        Path::new("/s/data"),
    );
    let filtered = located
        .clone()
        .with_data_set(vec![FileEntry::file("a/1.txt")]);
    assert!(located.data_set.is_none());
    assert_eq!(filtered.data_set, Some(vec![FileEntry::file("a/1.txt")]));
    assert_eq!(filtered.profile_type, ProfileType::Managed);

    let settled = filtered.with_registry_document(RegistryDocument::header_only());
    assert_eq!(settled.registry_document, Some(RegistryDocument::header_only()));
}

#[test]
fn already_migrated_descriptor_has_no_sources() {
    let descriptor = ProfileDescriptor::already_migrated();
    assert_eq!(descriptor.profile_type, ProfileType::AlreadyMigrated);
    assert!(descriptor.settings_source.is_none());
    assert!(descriptor.data_source.is_none());
}

#[test]
fn file_entry_leaf_name_ignores_ancestry() {
    assert_eq!(FileEntry::file("a/b/report.txt").leaf_name(), Some("report.txt"));
    assert_eq!(FileEntry::directory("a/b").leaf_name(), Some("b"));
}
