use std::fs;
use std::time::UNIX_EPOCH;

use livery::{FileConfigLoader, HandlebarsViews, TemplateVars, Themes};

#[test]
fn header_body_footer_with_versioned_stylesheet() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let theme = root.join("public/themes/default");
    fs::create_dir_all(theme.join("css")).unwrap();
    fs::create_dir_all(root.join("views")).unwrap();
    fs::write(
        theme.join("header.html"),
        "<html><head><title>{{page_title}}</title>{{render_css}}</head><body>\n",
    )
    .unwrap();
    fs::write(theme.join("index.html"), "{{{content}}}\n").unwrap();
    fs::write(theme.join("footer.html"), "{{render_js}}</body></html>\n").unwrap();
    fs::write(theme.join("css/style.css"), "body { margin: 0; }").unwrap();
    fs::write(root.join("views/home.html"), "<h1>{{title}}</h1>").unwrap();
    fs::write(
        root.join("themes.yaml"),
        format!(
            "theme: default\nuse_full_template: false\nbase_url: https://example.com/\npublic_path: {}\nviews_path: {}\n",
            root.join("public").display(),
            root.join("views").display(),
        ),
    )
    .unwrap();

    let mut themes = Themes::new(FileConfigLoader::new(root), HandlebarsViews::new()).headless(true);
    themes.init(None).unwrap().add_css("style.css").set_page_title("Home");
    let data = TemplateVars::default().with("title", "Home").unwrap();
    let out = themes.render_to_string(Some("home"), data).unwrap();

    let version = fs::metadata(theme.join("css/style.css"))
        .unwrap()
        .modified()
        .unwrap()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let link = format!(
        "<link href=\"https://example.com/themes/default/css/style.css?v={}\" rel=\"stylesheet\" type=\"text/css\" />\n",
        version
    );
    assert_eq!(
        out,
        format!(
            "<html><head><title>Home</title>{}</head><body>\n<h1>Home</h1>\n</body></html>\n",
            link
        )
    );
    assert_eq!(themes.data().get_str("page_title"), Some("Home"));

    let mut css = Vec::new();
    themes.render_css(&mut css).unwrap();
    assert_eq!(String::from_utf8(css).unwrap(), link);
}

#[test]
fn literal_body_without_config_file_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let mut themes = Themes::new(FileConfigLoader::new(dir.path()), HandlebarsViews::new());
    let err = themes
        .render_to_string(Some("<p>Hello</p>"), TemplateVars::default())
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<livery::Error>(),
        Some(livery::Error::NoSuchConfig(name, _)) if name == "themes"
    ));
}
