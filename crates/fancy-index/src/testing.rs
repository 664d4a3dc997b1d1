//! Fakes shared by the unit tests.

use fancy_apps::{
    ActionInfo, Description, DescriptionResolver, LaunchError, LaunchHandle, MenuCategory,
    MenuError, MenuNode, MenuSource, ResolveError,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

/// Everything the recording handles were asked to do.
pub(crate) type LaunchLog = Rc<RefCell<Vec<String>>>;

pub(crate) struct RecordingHandle {
    id: String,
    log: LaunchLog,
    actions: Vec<ActionInfo>,
    fail: bool,
}

impl LaunchHandle for RecordingHandle {
    fn start(&self) -> Result<(), LaunchError> {
        if self.fail {
            return Err(LaunchError::Spawn {
                command: format!("run {}", self.id),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            });
        }
        self.log.borrow_mut().push(format!("start {}", self.id));
        Ok(())
    }

    fn list_actions(&self) -> Vec<ActionInfo> {
        self.actions.clone()
    }

    fn activate_action(&self, id: &str, args: &[String]) -> Result<(), LaunchError> {
        if !self.actions.iter().any(|a| a.id == id) {
            return Err(LaunchError::UnknownAction(id.to_string()));
        }
        self.log
            .borrow_mut()
            .push(format!("action {} {} {:?}", self.id, id, args));
        Ok(())
    }
}

pub(crate) fn description(id: &str, title: &str, comment: &str, keywords: &[&str]) -> Description {
    Description {
        id: id.to_string(),
        title: title.to_string(),
        comment: comment.to_string(),
        icon: None,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        handle: Box::new(RecordingHandle {
            id: id.to_string(),
            log: LaunchLog::default(),
            actions: Vec::new(),
            fail: false,
        }),
    }
}

#[derive(Clone, Default)]
struct FakeApp {
    title: String,
    comment: String,
    keywords: Vec<String>,
    actions: Vec<ActionInfo>,
    fail: bool,
}

/// Resolves a fixed set of ids; counts how often each was resolved.
#[derive(Clone, Default)]
pub(crate) struct FakeResolver {
    apps: HashMap<String, FakeApp>,
    pub log: LaunchLog,
    pub resolved: Rc<RefCell<HashMap<String, usize>>>,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn app(mut self, id: &str, title: &str, comment: &str, keywords: &[&str]) -> Self {
        self.apps.insert(
            id.to_string(),
            FakeApp {
                title: title.to_string(),
                comment: comment.to_string(),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
                ..Default::default()
            },
        );
        self
    }

    pub fn action(mut self, id: &str, action_id: &str, name: &str) -> Self {
        if let Some(app) = self.apps.get_mut(id) {
            app.actions.push(ActionInfo {
                id: action_id.to_string(),
                name: name.to_string(),
                icon: None,
            });
        }
        self
    }

    pub fn failing(mut self, id: &str) -> Self {
        if let Some(app) = self.apps.get_mut(id) {
            app.fail = true;
        }
        self
    }

    pub fn resolve_count(&self, id: &str) -> usize {
        self.resolved.borrow().get(id).copied().unwrap_or(0)
    }
}

impl DescriptionResolver for FakeResolver {
    fn resolve(&self, id: &str) -> Result<Description, ResolveError> {
        let app = self
            .apps
            .get(id)
            .ok_or_else(|| ResolveError::NotFound(id.to_string()))?;
        *self.resolved.borrow_mut().entry(id.to_string()).or_default() += 1;

        Ok(Description {
            id: id.to_string(),
            title: app.title.clone(),
            comment: app.comment.clone(),
            icon: Some(format!("{}-icon", app.title.to_lowercase())),
            keywords: app.keywords.clone(),
            handle: Box::new(RecordingHandle {
                id: id.to_string(),
                log: self.log.clone(),
                actions: app.actions.clone(),
                fail: app.fail,
            }),
        })
    }
}

pub(crate) fn category(name: &str, children: Vec<MenuNode>) -> MenuNode {
    MenuNode::Category(MenuCategory {
        name: name.to_string(),
        title: None,
        icon: Some(format!("{}-icon", name.to_lowercase())),
        children,
    })
}

pub(crate) fn link(id: &str) -> MenuNode {
    MenuNode::AppLink(id.to_string())
}

/// A menu source whose file cannot be parsed.
pub(crate) struct BrokenSource;

impl MenuSource for BrokenSource {
    fn read(&self) -> Result<Vec<MenuNode>, MenuError> {
        Err(MenuError::Invalid {
            path: PathBuf::from("broken.menu"),
            reason: "root element is <Layout>, expected <Menu>".to_string(),
        })
    }
}

/// Utilities { A: Text Editor, Accessories { B: Calculator } }
pub(crate) fn utilities_menu() -> (FakeResolver, Vec<MenuNode>) {
    let resolver = FakeResolver::new()
        .app("/apps/a.desktop", "Text Editor", "Edit text files", &["edit", "write"])
        .app("/apps/b.desktop", "Calculator", "Do some math", &[]);
    let menu = vec![category(
        "Utilities",
        vec![
            link("/apps/a.desktop"),
            category("Accessories", vec![link("/apps/b.desktop")]),
        ],
    )];
    (resolver, menu)
}
