use importguard_core::{
    ConfigurationSnapshot, FileSettingsHost, GuardConfig, LayoutSegment, PasteImports, SettingValue, SettingsDocument,
    SettingsHost, SharedHost,
};
use importguard_rules::validators::names;
use importguard_rules::{
    fix_file_imports, load_style, startup_check, ComplianceEngine, HouseStyle, RecordingNotifier, StartupOutcome,
};
use std::fs;
use std::path::Path;
use std::thread;
use tempfile::tempdir;

fn legacy_document() -> SettingsDocument {
    let mut document = SettingsDocument {
        host: Some("IDEA 2021.3".to_string()),
        ..SettingsDocument::default()
    };
    let settings = &mut document.settings;
    settings.insert("add_unambigious_imports_on_the_fly".into(), SettingValue::Bool(false));
    settings.insert("optimize_imports_on_the_fly".into(), SettingValue::Bool(false));
    settings.insert("add_imports_on_paste".into(), SettingValue::Paste(PasteImports::Ask));
    settings.insert("detect_indents".into(), SettingValue::Bool(true));
    settings.insert("class_count_to_use_import_on_demand".into(), SettingValue::Int(5));
    settings.insert("names_count_to_use_import_on_demand".into(), SettingValue::Int(3));
    settings.insert(
        "import_layout_table".into(),
        SettingValue::Layout(vec![
            LayoutSegment::AllOtherImports,
            LayoutSegment::package("javax"),
            LayoutSegment::package("java"),
            LayoutSegment::BlankLine,
            LayoutSegment::AllOtherStaticImports,
        ]),
    );
    settings.insert("use_fully_qualified_class_names".into(), SettingValue::Bool(true));
    settings.insert("layout_static_imports_separately".into(), SettingValue::Bool(true));
    document
}

fn modern_document() -> SettingsDocument {
    let mut document = legacy_document();
    document.host = Some("IDEA 2025.1".to_string());
    let settings = &mut document.settings;
    settings.insert("module_import_group".into(), SettingValue::Bool(true));
    settings.insert("do_not_separate_module_imports".into(), SettingValue::Bool(false));
    settings.insert("delete_unused_module_imports".into(), SettingValue::Bool(true));
    settings.insert("show_import_popup".into(), SettingValue::Bool(false));
    settings.insert("class_names_in_javadoc".into(), SettingValue::Int(1));
    document
}

#[test]
fn test_yaml_host_remediates_and_persists() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("idea.yaml");
    FileSettingsHost::create(&path, legacy_document()).unwrap();

    let engine = ComplianceEngine::default();
    let mut host = FileSettingsHost::open(&path).unwrap();
    let remediation = engine.remediate(&mut host).unwrap();

    assert_eq!(
        remediation.before,
        vec![
            names::AUTO_IMPORT_ENABLED,
            names::INDENT_DETECTION_DISABLED,
            names::NO_WILDCARD_IMPORTS,
            names::IMPORT_LAYOUT_ORDER,
            names::NO_FULLY_QUALIFIED_CLASS_NAMES,
        ]
    );
    assert!(remediation.is_closed());

    let reopened = FileSettingsHost::open(&path).unwrap();
    assert!(engine.check_compliance(&ConfigurationSnapshot::capture(&reopened)).is_empty());
    assert_eq!(
        reopened.get_setting("class_count_to_use_import_on_demand"),
        Some(SettingValue::Int(99))
    );
    assert_eq!(reopened.host_label(), Some("IDEA 2021.3"));
    // no new names appear on an old host
    assert!(!reopened.has_setting("auto_import_on_the_fly"));
    assert!(!reopened.has_setting("class_names_in_javadoc"));
}

#[test]
fn test_module_capable_host_gets_module_layout_and_companions() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("idea.toml");
    FileSettingsHost::create(&path, modern_document()).unwrap();

    let engine = ComplianceEngine::default();
    let mut host = FileSettingsHost::open(&path).unwrap();
    let remediation = engine.remediate(&mut host).unwrap();
    assert!(remediation.before.contains(&names::MODULE_IMPORTS_FIRST));
    assert!(remediation.is_closed());

    let reopened = FileSettingsHost::open(&path).unwrap();
    let layout = match reopened.get_setting("import_layout_table") {
        Some(SettingValue::Layout(layout)) => layout,
        other => panic!("unexpected layout {:?}", other),
    };
    assert_eq!(layout[0], LayoutSegment::ModuleImports);
    assert_eq!(
        reopened.get_setting("do_not_separate_module_imports"),
        Some(SettingValue::Bool(true))
    );
    assert_eq!(
        reopened.get_setting("delete_unused_module_imports"),
        Some(SettingValue::Bool(false))
    );
    assert_eq!(reopened.get_setting("show_import_popup"), Some(SettingValue::Bool(true)));
    assert_eq!(reopened.get_setting("class_names_in_javadoc"), Some(SettingValue::Int(2)));
}

#[test]
fn test_read_only_setting_stays_reported() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("idea.json");
    let mut document = legacy_document();
    document.read_only.insert("detect_indents".to_string());
    FileSettingsHost::create(&path, document).unwrap();

    let engine = ComplianceEngine::default();
    let mut host = FileSettingsHost::open(&path).unwrap();
    let remediation = engine.remediate(&mut host).unwrap();

    assert_eq!(remediation.remaining, vec![names::INDENT_DETECTION_DISABLED]);
    assert_eq!(remediation.report.failed.len(), 1);

    // everything else was still written
    let reopened = FileSettingsHost::open(&path).unwrap();
    assert_eq!(
        engine.check_compliance(&ConfigurationSnapshot::capture(&reopened)),
        vec![names::INDENT_DETECTION_DISABLED]
    );
}

#[test]
fn test_house_style_skip_and_threshold() {
    let temp = tempdir().unwrap();
    let style_path = temp.path().join(".house-style.yaml");
    fs::write(
        &style_path,
        "wildcard_threshold: 500\nskip:\n  - no_fully_qualified_class_names\n",
    )
    .unwrap();
    let style = load_style(&style_path).unwrap();

    let path = temp.path().join("idea.json");
    FileSettingsHost::create(&path, legacy_document()).unwrap();
    let mut host = FileSettingsHost::open(&path).unwrap();

    let engine = ComplianceEngine::new(&style);
    let remediation = engine.remediate(&mut host).unwrap();
    assert!(!remediation.before.contains(&names::NO_FULLY_QUALIFIED_CLASS_NAMES));

    assert_eq!(
        host.get_setting("names_count_to_use_import_on_demand"),
        Some(SettingValue::Int(500))
    );
    assert_eq!(
        host.get_setting("use_fully_qualified_class_names"),
        Some(SettingValue::Bool(true))
    );
    // the default style still sees the skipped rule
    assert_eq!(
        ComplianceEngine::new(&HouseStyle::default()).check_compliance(&ConfigurationSnapshot::capture(&host)),
        vec![names::NO_FULLY_QUALIFIED_CLASS_NAMES]
    );
}

#[test]
fn test_concurrent_remediation_converges() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("idea.json");
    FileSettingsHost::create(&path, modern_document()).unwrap();
    let shared = SharedHost::new(FileSettingsHost::open(&path).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            thread::spawn(move || {
                let engine = ComplianceEngine::default();
                shared.with_host(|host| engine.remediate(host)).unwrap().unwrap()
            })
        })
        .collect();

    let fixes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    // exactly one thread found work to do
    assert_eq!(fixes.iter().filter(|r| !r.before.is_empty()).count(), 1);
    assert!(fixes.iter().all(|r| r.is_closed()));

    let reopened = FileSettingsHost::open(&path).unwrap();
    assert!(ComplianceEngine::default()
        .check_compliance(&ConfigurationSnapshot::capture(&reopened))
        .is_empty());
}

fn write_java(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_startup_then_fix_file_end_to_end() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    let settings = root.join("idea.json");
    FileSettingsHost::create(&settings, modern_document()).unwrap();

    write_java(
        root,
        "src/main/java/app/Main.java",
        "package app;\n\nimport static org.junit.Assert.fail;\nimport org.slf4j.Logger;\nimport module java.base;\nimport javax.swing.JPanel;\nimport java.util.List;\n\npublic class Main {}\n",
    );
    write_java(root, "target/generated/Gen.java", "import org.b.C;\nimport java.util.List;\n");

    let engine = ComplianceEngine::default();
    let declined = RecordingNotifier::new(false);
    let mut host = FileSettingsHost::open(&settings).unwrap();

    let outcome = startup_check(&engine, &mut host, &declined, true).unwrap();
    assert!(matches!(outcome, StartupOutcome::Reported { .. }));
    assert!(!host.is_dirty());

    let report = fix_file_imports(
        &engine,
        &mut host,
        &declined,
        root,
        "**/*.java",
        &GuardConfig::default(),
    )
    .unwrap();

    assert!(report.remediation.is_closed());
    assert_eq!(report.organised, vec![root.join("src/main/java/app/Main.java")]);
    assert_eq!(
        fs::read_to_string(root.join("src/main/java/app/Main.java")).unwrap(),
        "package app;\n\nimport module java.base;\nimport java.util.List;\nimport javax.swing.JPanel;\nimport org.slf4j.Logger;\n\nimport static org.junit.Assert.fail;\n\npublic class Main {}\n"
    );
    // ignored directory untouched
    assert_eq!(
        fs::read_to_string(root.join("target/generated/Gen.java")).unwrap(),
        "import org.b.C;\nimport java.util.List;\n"
    );

    let again = startup_check(&engine, &mut host, &declined, true).unwrap();
    assert_eq!(again, StartupOutcome::Compliant);
}
