use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A task declared by a project, addressable by its build-wide path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskNode {
    /// Absolute task path, e.g. `:lib:compile`.
    pub path: String,
    pub description: Option<String>,
    /// Absolute paths of tasks that must run before this one.
    pub dependencies: Vec<String>,
}

impl TaskNode {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            description: None,
            dependencies: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_dependency(mut self, path: impl Into<String>) -> Self {
        self.dependencies.push(path.into());
        self
    }
}

/// A project in the build tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectModel {
    pub name: String,
    /// Project path, `:` for the root project.
    pub path: String,
    pub tasks: Vec<TaskNode>,
    pub subprojects: Vec<ProjectModel>,
}

impl ProjectModel {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            tasks: Vec::new(),
            subprojects: Vec::new(),
        }
    }

    pub fn with_task(mut self, task: TaskNode) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn with_subproject(mut self, project: ProjectModel) -> Self {
        self.subprojects.push(project);
        self
    }

    fn find_task(&self, path: &str) -> Option<&TaskNode> {
        self.tasks
            .iter()
            .find(|t| t.path == path)
            .or_else(|| self.subprojects.iter().find_map(|p| p.find_task(path)))
    }

    fn find_project(&self, path: &str) -> Option<&ProjectModel> {
        if self.path == path {
            return Some(self);
        }
        self.subprojects.iter().find_map(|p| p.find_project(path))
    }

    fn collect_tasks<'a>(&'a self, into: &mut Vec<&'a TaskNode>) {
        into.extend(self.tasks.iter());
        for sub in &self.subprojects {
            sub.collect_tasks(into);
        }
    }
}

/// The build model exposed to phased actions.
///
/// Loaded during the after-loading phase, configured before the
/// after-configuration phase. The requested task set can still be extended by
/// after-configuration actions since no task has run yet at that point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildModel {
    pub root_project: ProjectModel,
    pub requested_tasks: Vec<String>,
    pub configured: bool,
}

impl BuildModel {
    pub fn new(root_project: ProjectModel) -> Self {
        Self {
            root_project,
            requested_tasks: Vec::new(),
            configured: false,
        }
    }

    /// Resolve a task path against the model.
    ///
    /// Absolute paths (`:a:b`) are matched directly; relative paths are
    /// resolved against the root project. A path whose project segment does
    /// not exist reports the missing project, not the missing task.
    pub fn resolve_task(&self, path: &str) -> Result<&TaskNode, CoreError> {
        let absolute = if path.starts_with(':') {
            path.to_string()
        } else {
            format!(":{path}")
        };
        if let Some(task) = self.root_project.find_task(&absolute) {
            return Ok(task);
        }

        let project_path = match absolute.rfind(':') {
            Some(0) | None => ":".to_string(),
            Some(index) => absolute[..index].to_string(),
        };
        if self.root_project.find_project(&project_path).is_none() {
            return Err(CoreError::ProjectNotFound(project_path));
        }
        Err(CoreError::TaskNotFound(path.to_string()))
    }

    /// Add a task to the requested set, deduplicating by path.
    pub fn request_task(&mut self, path: impl Into<String>) {
        let path = path.into();
        if !self.requested_tasks.contains(&path) {
            self.requested_tasks.push(path);
        }
    }

    /// All tasks declared anywhere in the project tree.
    pub fn all_tasks(&self) -> Vec<&TaskNode> {
        let mut tasks = Vec::new();
        self.root_project.collect_tasks(&mut tasks);
        tasks
    }
}

/// Summary of one executed task, visible to after-build actions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskOutcome {
    pub path: String,
    pub success: bool,
}
