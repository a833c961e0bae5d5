//! Task execution planning.
//!
//! Produces a linear execution order from the requested task paths:
//! transitive dependencies first, each task at most once, cycles rejected.

use std::collections::HashSet;

use forgelink_core::{BuildModel, CoreError};

use crate::error::{EngineError, Result};

/// Plan the execution order for the requested tasks.
///
/// Paths are resolved against the model (absolute or relative to the root
/// project); the returned order is dependency-before-dependent.
pub fn plan_execution(model: &BuildModel, requested: &[String]) -> Result<Vec<String>> {
    let mut order = Vec::new();
    let mut done = HashSet::new();
    let mut in_progress = HashSet::new();

    for path in requested {
        visit(model, path, &mut order, &mut done, &mut in_progress)?;
    }

    Ok(order)
}

fn visit(
    model: &BuildModel,
    path: &str,
    order: &mut Vec<String>,
    done: &mut HashSet<String>,
    in_progress: &mut HashSet<String>,
) -> Result<()> {
    let task = model.resolve_task(path)?;
    let absolute = task.path.clone();

    if done.contains(&absolute) {
        return Ok(());
    }
    if !in_progress.insert(absolute.clone()) {
        return Err(EngineError::Core(CoreError::Validation(format!(
            "task dependency cycle involving {absolute}"
        ))));
    }

    for dependency in task.dependencies.clone() {
        visit(model, &dependency, order, done, in_progress)?;
    }

    in_progress.remove(&absolute);
    done.insert(absolute.clone());
    order.push(absolute);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use forgelink_core::{ProjectModel, TaskNode};

    fn model() -> BuildModel {
        let root = ProjectModel::new("root", ":")
            .with_task(TaskNode::new(":compile"))
            .with_task(TaskNode::new(":test").with_dependency(":compile"))
            .with_task(
                TaskNode::new(":check")
                    .with_dependency(":test")
                    .with_dependency(":compile"),
            );
        BuildModel::new(root)
    }

    #[test]
    fn test_dependencies_run_first() {
        let order = plan_execution(&model(), &[":check".to_string()]).unwrap();
        assert_eq!(order, vec![":compile", ":test", ":check"]);
    }

    #[test]
    fn test_each_task_once() {
        let order =
            plan_execution(&model(), &[":test".to_string(), ":check".to_string()]).unwrap();
        assert_eq!(order, vec![":compile", ":test", ":check"]);
    }

    #[test]
    fn test_empty_request_plans_nothing() {
        let order = plan_execution(&model(), &[]).unwrap();
        assert!(order.is_empty());
    }

    #[test]
    fn test_unknown_task_is_rejected() {
        let result = plan_execution(&model(), &[":nope".to_string()]);
        assert!(matches!(
            result,
            Err(EngineError::Core(CoreError::TaskNotFound(_)))
        ));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let root = ProjectModel::new("root", ":")
            .with_task(TaskNode::new(":a").with_dependency(":b"))
            .with_task(TaskNode::new(":b").with_dependency(":a"));
        let cyclic = BuildModel::new(root);

        let result = plan_execution(&cyclic, &[":a".to_string()]);
        assert!(matches!(
            result,
            Err(EngineError::Core(CoreError::Validation(_)))
        ));
    }
}
