use localaudit::config::{Config, ReportStyle, Section};

#[test]
fn default_config_is_usable() {
    let config = Config::default();
    assert_eq!(config.llm.model, "gemini-2.5-flash");
    assert!(config.llm.timeout > 0);
    assert!(config.probe.timeout > 0);
    assert_eq!(config.lookup.language, "fr");
    assert_eq!(config.report.sections.len(), 5);
}

#[test]
fn report_style_round_trips_through_yaml() {
    let style = ReportStyle::default();
    let yaml = serde_yaml::to_string(&style).unwrap();
    let back: ReportStyle = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back.accent, style.accent);
    assert_eq!(back.sections, style.sections);
    assert_eq!(back.wrap_width, style.wrap_width);
}

#[test]
fn section_order_is_configurable() {
    let yaml = "accent: [0, 0, 0]\nbullet: '*'\nsections: [score, company]\nwrap_width: 80\nmax_line: 100\n";
    let style: ReportStyle = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(style.sections, vec![Section::Score, Section::Company]);
    assert_eq!(style.bullet, "*");
}
