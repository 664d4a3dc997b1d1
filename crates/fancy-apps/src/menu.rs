//! XDG application menu reader.
//!
//! Reads a freedesktop `.menu` file and lays it out against the installed
//! desktop files, producing a plain tree of categories and app links:
//! - `<Include>`/`<Exclude>` rules with `Filename`, `Category`, `All`, `And`, `Or`, `Not`
//! - `<OnlyUnallocated/>` menus only get apps no other menu claimed
//! - titles and icons come from `.directory` files
//!
//! Merging (`MergeFile`, `Move`, `Layout`) is not supported; those elements are ignored.

use crate::catalog::AppCatalog;
use crate::desktop_entry::{DesktopFile, Locale, parse_directory_file};
use crate::error::MenuError;
use crate::paths::{
    get_application_directories, get_current_desktops, get_directory_file_directories,
};
use log::{debug, info};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Desktop names used when XDG_CURRENT_DESKTOP is unset.
pub const DEFAULT_ENVIRONMENTS: [&str; 2] = ["X-LXQT", "LXQt"];

/// One node of a menu tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuNode {
    Category(MenuCategory),
    /// Identifier of a launchable description (desktop file path).
    AppLink(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuCategory {
    pub name: String,
    pub title: Option<String>,
    pub icon: Option<String>,
    pub children: Vec<MenuNode>,
}

/// Something that can produce a menu tree on demand.
pub trait MenuSource {
    /// The top level nodes of the menu.
    fn read(&self) -> Result<Vec<MenuNode>, MenuError>;
}

impl MenuSource for Vec<MenuNode> {
    fn read(&self) -> Result<Vec<MenuNode>, MenuError> {
        Ok(self.clone())
    }
}

/// A `.menu` file plus the environment it is evaluated in.
#[derive(Clone, Debug)]
pub struct XdgMenu {
    file: PathBuf,
    environments: Vec<String>,
    locale: Option<Locale>,
}

impl XdgMenu {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        let mut environments = get_current_desktops();
        if environments.is_empty() {
            environments = DEFAULT_ENVIRONMENTS.iter().map(|s| s.to_string()).collect();
        }
        Self {
            file: file.into(),
            environments,
            locale: Locale::from_env(),
        }
    }

    /// The default applications menu of this session, if one is installed.
    pub fn find_default() -> Result<Self, MenuError> {
        crate::paths::get_menu_file()
            .map(Self::new)
            .ok_or(MenuError::NotFound)
    }

    pub fn with_environments(mut self, environments: Vec<String>) -> Self {
        self.environments = environments;
        self
    }

    pub fn with_locale(mut self, locale: Option<Locale>) -> Self {
        self.locale = locale;
        self
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    fn load_definition(&self) -> Result<MenuDefinition, MenuError> {
        let content = fs::read_to_string(&self.file).map_err(|source| MenuError::Io {
            path: self.file.clone(),
            source,
        })?;
        let root = parse_element_tree(&self.file, &content)?;
        if root.name != "Menu" {
            return Err(MenuError::Invalid {
                path: self.file.clone(),
                reason: format!("root element is <{}>, expected <Menu>", root.name),
            });
        }

        let base = self.file.parent().unwrap_or_else(|| Path::new("/"));
        let mut definition = MenuDefinition::default();
        let root_menu = MenuDef::from_element(&root, base, &mut definition);
        definition.root = root_menu;
        Ok(definition)
    }
}

impl MenuSource for XdgMenu {
    fn read(&self) -> Result<Vec<MenuNode>, MenuError> {
        let definition = self.load_definition()?;

        let mut catalog = AppCatalog::with_directories(definition.app_directories());
        catalog.set_locale(self.locale.clone());
        catalog.refresh();

        let pool: Vec<DesktopFile> = catalog
            .load_all()
            .into_iter()
            .filter(|app| !app.no_display && app.is_shown_in(&self.environments))
            .collect();

        let mut allocated = HashSet::new();
        definition.root.allocate(&pool, &mut allocated);

        let layout = Layout {
            pool: &pool,
            allocated: &allocated,
            directory_dirs: definition.directory_directories(),
            locale: self.locale.as_ref(),
        };
        let nodes = layout.children(&definition.root);

        info!(
            "Read menu {} ({} apps available)",
            self.file.display(),
            pool.len()
        );
        Ok(nodes)
    }
}

/// Minimal XML element: name, trimmed text and child elements.
#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

fn parse_element_tree(path: &Path, xml: &str) -> Result<Element, MenuError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;
    let mut buf = Vec::new();

    let xml_error = |reader: &Reader<&[u8]>, source: quick_xml::Error| MenuError::Xml {
        path: path.to_path_buf(),
        position: reader.buffer_position(),
        source,
    };

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => stack.push(Element {
                name: String::from_utf8_lossy(e.local_name().as_ref()).to_string(),
                ..Default::default()
            }),
            Ok(Event::Empty(ref e)) => {
                let element = Element {
                    name: String::from_utf8_lossy(e.local_name().as_ref()).to_string(),
                    ..Default::default()
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = root.or(Some(element)),
                }
            }
            Ok(Event::End(_)) => {
                if let Some(element) = stack.pop() {
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => root = root.or(Some(element)),
                    }
                }
            }
            Ok(Event::Text(ref t)) => {
                let text = t.unescape().map_err(|e| xml_error(&reader, e))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(ref t)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(t));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(&reader, e)),
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(MenuError::Invalid {
            path: path.to_path_buf(),
            reason: format!("unexpected end of file inside <{}>", stack[stack.len() - 1].name),
        });
    }
    root.ok_or_else(|| MenuError::Invalid {
        path: path.to_path_buf(),
        reason: "document has no root element".to_string(),
    })
}

/// Include/Exclude matching rule.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Rule {
    Filename(String),
    Category(String),
    All,
    And(Vec<Rule>),
    Or(Vec<Rule>),
    Not(Vec<Rule>),
}

impl Rule {
    fn from_element(element: &Element) -> Option<Self> {
        let children = || -> Vec<Rule> {
            element.children.iter().filter_map(Rule::from_element).collect()
        };
        match element.name.as_str() {
            "Filename" => Some(Rule::Filename(element.text.clone())),
            "Category" => Some(Rule::Category(element.text.clone())),
            "All" => Some(Rule::All),
            "And" => Some(Rule::And(children())),
            "Or" => Some(Rule::Or(children())),
            "Not" => Some(Rule::Not(children())),
            _ => None,
        }
    }

    fn matches(&self, app: &DesktopFile) -> bool {
        match self {
            Rule::Filename(id) => &app.id == id,
            Rule::Category(category) => app.categories.iter().any(|c| c == category),
            Rule::All => true,
            Rule::And(rules) => rules.iter().all(|r| r.matches(app)),
            Rule::Or(rules) => rules.iter().any(|r| r.matches(app)),
            Rule::Not(rules) => !rules.iter().any(|r| r.matches(app)),
        }
    }
}

/// Search directories collected over the whole document.
#[derive(Debug, Default)]
struct MenuDefinition {
    root: MenuDef,
    /// In document order; later entries take precedence.
    app_dirs: Vec<PathBuf>,
    directory_dirs: Vec<PathBuf>,
}

impl MenuDefinition {
    /// App dirs most important first.
    fn app_directories(&self) -> Vec<PathBuf> {
        if self.app_dirs.is_empty() {
            return get_application_directories();
        }
        dedup_reversed(&self.app_dirs)
    }

    fn directory_directories(&self) -> Vec<PathBuf> {
        if self.directory_dirs.is_empty() {
            return get_directory_file_directories();
        }
        dedup_reversed(&self.directory_dirs)
    }
}

fn dedup_reversed(dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    dirs.iter()
        .rev()
        .filter(|d| seen.insert(d.to_path_buf()))
        .cloned()
        .collect()
}

#[derive(Debug, Default)]
struct MenuDef {
    name: String,
    /// `.directory` file names; the last one that can be read wins.
    directories: Vec<String>,
    include: Vec<Rule>,
    exclude: Vec<Rule>,
    only_unallocated: bool,
    deleted: bool,
    submenus: Vec<MenuDef>,
}

impl MenuDef {
    fn from_element(element: &Element, base: &Path, definition: &mut MenuDefinition) -> Self {
        let mut menu = MenuDef::default();

        for child in &element.children {
            match child.name.as_str() {
                "Name" => menu.name = child.text.clone(),
                "Directory" => menu.directories.push(child.text.clone()),
                "Include" => menu
                    .include
                    .extend(child.children.iter().filter_map(Rule::from_element)),
                "Exclude" => menu
                    .exclude
                    .extend(child.children.iter().filter_map(Rule::from_element)),
                "OnlyUnallocated" => menu.only_unallocated = true,
                "NotOnlyUnallocated" => menu.only_unallocated = false,
                "Deleted" => menu.deleted = true,
                "NotDeleted" => menu.deleted = false,
                "AppDir" => definition.app_dirs.push(base.join(&child.text)),
                "DefaultAppDirs" => {
                    // Lowest priority first, like the rest of the list
                    let mut defaults = get_application_directories();
                    defaults.reverse();
                    definition.app_dirs.extend(defaults);
                }
                "DirectoryDir" => definition.directory_dirs.push(base.join(&child.text)),
                "DefaultDirectoryDirs" => {
                    let mut defaults = get_directory_file_directories();
                    defaults.reverse();
                    definition.directory_dirs.extend(defaults);
                }
                "Menu" => {
                    let submenu = MenuDef::from_element(child, base, definition);
                    menu.submenus.push(submenu);
                }
                other => debug!("Ignoring <{}> in menu {}", other, menu.name),
            }
        }

        menu
    }

    fn matches(&self, app: &DesktopFile) -> bool {
        self.include.iter().any(|r| r.matches(app)) && !self.exclude.iter().any(|r| r.matches(app))
    }

    /// First pass: record every app claimed by a regular menu.
    fn allocate(&self, pool: &[DesktopFile], allocated: &mut HashSet<String>) {
        if self.deleted {
            return;
        }
        if !self.only_unallocated {
            for app in pool.iter().filter(|app| self.matches(app)) {
                allocated.insert(app.id.clone());
            }
        }
        for submenu in &self.submenus {
            submenu.allocate(pool, allocated);
        }
    }
}

struct Layout<'a> {
    pool: &'a [DesktopFile],
    allocated: &'a HashSet<String>,
    directory_dirs: Vec<PathBuf>,
    locale: Option<&'a Locale>,
}

impl Layout<'_> {
    /// Sub-menus first in document order, then the menu's apps sorted by title.
    fn children(&self, menu: &MenuDef) -> Vec<MenuNode> {
        let mut nodes: Vec<MenuNode> = menu
            .submenus
            .iter()
            .filter(|m| !m.deleted)
            .filter_map(|m| self.category(m))
            .map(MenuNode::Category)
            .collect();

        let mut apps: Vec<&DesktopFile> = self
            .pool
            .iter()
            .filter(|app| menu.matches(app))
            .filter(|app| !menu.only_unallocated || !self.allocated.contains(&app.id))
            .collect();
        apps.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        nodes.extend(
            apps.into_iter()
                .map(|app| MenuNode::AppLink(app.path.to_string_lossy().to_string())),
        );

        nodes
    }

    /// None when the menu ends up without any app.
    fn category(&self, menu: &MenuDef) -> Option<MenuCategory> {
        let children = self.children(menu);
        if children.is_empty() {
            return None;
        }

        let directory = menu.directories.iter().rev().find_map(|file| {
            self.directory_dirs
                .iter()
                .find_map(|dir| parse_directory_file(&dir.join(file), self.locale))
        });

        Some(MenuCategory {
            name: menu.name.clone(),
            title: directory.as_ref().map(|d| d.name.clone()),
            icon: directory.and_then(|d| d.icon),
            children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            fs::create_dir_all(dir.path().join("apps")).unwrap();
            fs::create_dir_all(dir.path().join("dirs")).unwrap();
            Fixture { dir }
        }

        fn app(&self, id: &str, name: &str, extra: &str) -> &Self {
            fs::write(
                self.dir.path().join("apps").join(id),
                format!(
                    "[Desktop Entry]\nType=Application\nName={}\nExec=true\n{}\n",
                    name, extra
                ),
            )
            .unwrap();
            self
        }

        fn directory(&self, file: &str, name: &str, icon: &str) -> &Self {
            fs::write(
                self.dir.path().join("dirs").join(file),
                format!("[Desktop Entry]\nType=Directory\nName={}\nIcon={}\n", name, icon),
            )
            .unwrap();
            self
        }

        fn menu(&self, body: &str) -> XdgMenu {
            let path = self.dir.path().join("applications.menu");
            fs::write(
                &path,
                format!(
                    "<!DOCTYPE Menu PUBLIC \"-//freedesktop//DTD Menu 1.0//EN\"\n \
                     \"http://www.freedesktop.org/standards/menu-spec/menu-1.0.dtd\">\n\
                     <Menu><Name>Applications</Name><AppDir>apps</AppDir>\
                     <DirectoryDir>dirs</DirectoryDir>{}</Menu>",
                    body
                ),
            )
            .unwrap();
            XdgMenu::new(path)
                .with_environments(vec!["LXQt".to_string()])
                .with_locale(None)
        }

        fn link(&self, id: &str) -> MenuNode {
            MenuNode::AppLink(self.dir.path().join("apps").join(id).to_string_lossy().to_string())
        }
    }

    fn category(node: &MenuNode) -> &MenuCategory {
        match node {
            MenuNode::Category(c) => c,
            MenuNode::AppLink(id) => panic!("expected category, got app {}", id),
        }
    }

    #[test]
    fn categories_and_nested_menus() {
        let fx = Fixture::new();
        fx.app("editor.desktop", "Text Editor", "Categories=Utility;")
            .app("calc.desktop", "Calculator", "Categories=Utility;Math;")
            .app("game.desktop", "Game", "Categories=Game;")
            .directory("utility.directory", "Utilities", "applications-utilities");

        let menu = fx.menu(
            "<Menu><Name>Utility</Name><Directory>utility.directory</Directory>\
               <Include><And><Category>Utility</Category><Not><Category>Math</Category></Not></And></Include>\
               <Menu><Name>Math</Name><Include><Category>Math</Category></Include></Menu>\
             </Menu>\
             <Menu><Name>Empty</Name><Include><Category>Office</Category></Include></Menu>",
        );
        let nodes = menu.read().unwrap();

        assert_eq!(nodes.len(), 1);
        let utility = category(&nodes[0]);
        assert_eq!(utility.name, "Utility");
        assert_eq!(utility.title.as_deref(), Some("Utilities"));
        assert_eq!(utility.icon.as_deref(), Some("applications-utilities"));
        assert_eq!(utility.children.len(), 2);

        let math = category(&utility.children[0]);
        assert_eq!(math.name, "Math");
        assert_eq!(math.title, None);
        assert_eq!(math.children, vec![fx.link("calc.desktop")]);
        assert_eq!(utility.children[1], fx.link("editor.desktop"));
    }

    #[test]
    fn only_unallocated_collects_leftovers() {
        let fx = Fixture::new();
        fx.app("editor.desktop", "Text Editor", "Categories=Utility;")
            .app("misc.desktop", "Misc", "Categories=Utility;");

        let menu = fx.menu(
            "<Menu><Name>Other</Name><OnlyUnallocated/><Include><All/></Include></Menu>\
             <Menu><Name>Utility</Name><Include><Filename>editor.desktop</Filename></Include></Menu>",
        );
        let nodes = menu.read().unwrap();

        assert_eq!(nodes.len(), 2);
        assert_eq!(category(&nodes[0]).children, vec![fx.link("misc.desktop")]);
        assert_eq!(category(&nodes[1]).children, vec![fx.link("editor.desktop")]);
    }

    #[test]
    fn hidden_and_foreign_apps_are_left_out() {
        let fx = Fixture::new();
        fx.app("a.desktop", "A", "Categories=Utility;")
            .app("b.desktop", "B", "Categories=Utility;\nNoDisplay=true")
            .app("c.desktop", "C", "Categories=Utility;\nOnlyShowIn=KDE;")
            .app("d.desktop", "D", "Categories=Utility;\nComment=Kept")
            .app("e.desktop", "E", "Categories=Utility;");

        let menu = fx.menu(
            "<Menu><Name>Utility</Name><Include><Category>Utility</Category></Include>\
             <Exclude><Filename>e.desktop</Filename></Exclude></Menu>\
             <Menu><Name>Gone</Name><Deleted/><Include><All/></Include></Menu>",
        );
        let nodes = menu.read().unwrap();

        assert_eq!(nodes.len(), 1);
        assert_eq!(
            category(&nodes[0]).children,
            vec![fx.link("a.desktop"), fx.link("d.desktop")]
        );
    }

    #[test]
    fn structural_errors() {
        let fx = Fixture::new();
        let missing = XdgMenu::new(fx.dir.path().join("nope.menu"));
        assert!(matches!(missing.read(), Err(MenuError::Io { .. })));

        let path = fx.dir.path().join("broken.menu");
        fs::write(&path, "<Menu><Name>x</Name></Other>").unwrap();
        assert!(matches!(XdgMenu::new(&path).read(), Err(MenuError::Xml { .. })));

        fs::write(&path, "<Menu><Name>x</Name>").unwrap();
        assert!(matches!(
            XdgMenu::new(&path).read(),
            Err(MenuError::Invalid { .. } | MenuError::Xml { .. })
        ));

        fs::write(&path, "<Layout/>").unwrap();
        assert!(matches!(XdgMenu::new(&path).read(), Err(MenuError::Invalid { .. })));
    }

    #[test]
    fn in_memory_trees_are_sources() {
        let tree = vec![MenuNode::Category(MenuCategory {
            name: "Utility".to_string(),
            title: None,
            icon: None,
            children: vec![MenuNode::AppLink("/a.desktop".to_string())],
        })];
        assert_eq!(tree.read().unwrap(), tree);
    }
}
