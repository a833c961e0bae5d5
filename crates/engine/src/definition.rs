//! Declarative build definition the engine loads a model from.
//!
//! This is the engine-side source of truth: which projects exist, which tasks
//! they declare, and how each task behaves when run. Loading produces the
//! [`BuildModel`] that phased actions inspect.

use std::collections::HashSet;

use forgelink_core::{BuildModel, ProjectModel, TaskNode};

/// One task declaration, including its runtime behavior.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub path: String,
    pub description: Option<String>,
    pub dependencies: Vec<String>,
    /// Whether running this task fails the build.
    pub fails: bool,
}

impl TaskSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            description: None,
            dependencies: Vec::new(),
            fails: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn depends_on(mut self, path: impl Into<String>) -> Self {
        self.dependencies.push(path.into());
        self
    }

    pub fn failing(mut self) -> Self {
        self.fails = true;
        self
    }
}

/// One project in the definition tree.
#[derive(Debug, Clone)]
pub struct ProjectSpec {
    pub name: String,
    pub path: String,
    pub tasks: Vec<TaskSpec>,
    pub subprojects: Vec<ProjectSpec>,
}

impl ProjectSpec {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            tasks: Vec::new(),
            subprojects: Vec::new(),
        }
    }

    pub fn with_task(mut self, task: TaskSpec) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn with_subproject(mut self, project: ProjectSpec) -> Self {
        self.subprojects.push(project);
        self
    }

    fn to_model(&self) -> ProjectModel {
        let mut model = ProjectModel::new(self.name.clone(), self.path.clone());
        for task in &self.tasks {
            let mut node = TaskNode::new(task.path.clone());
            node.description = task.description.clone();
            node.dependencies = task.dependencies.clone();
            model.tasks.push(node);
        }
        for sub in &self.subprojects {
            model.subprojects.push(sub.to_model());
        }
        model
    }

    fn collect_failing(&self, into: &mut HashSet<String>) {
        for task in &self.tasks {
            if task.fails {
                into.insert(task.path.clone());
            }
        }
        for sub in &self.subprojects {
            sub.collect_failing(into);
        }
    }
}

/// The build the engine executes against.
#[derive(Debug, Clone)]
pub struct BuildDefinition {
    root: ProjectSpec,
}

impl BuildDefinition {
    pub fn new(root: ProjectSpec) -> Self {
        Self { root }
    }

    /// A single root project with no tasks; useful as a minimal build.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(ProjectSpec::new(name, ":"))
    }

    /// Load the model phased actions will see.
    pub fn load(&self) -> BuildModel {
        BuildModel::new(self.root.to_model())
    }

    /// Paths of tasks that fail when run.
    pub fn failing_tasks(&self) -> HashSet<String> {
        let mut failing = HashSet::new();
        self.root.collect_failing(&mut failing);
        failing
    }
}
