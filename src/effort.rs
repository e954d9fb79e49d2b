use crate::model::WorkItem;

/// Sum a numeric field across any collection using an explicit accessor.
/// Shared by effort and velocity style summations; no introspection.
pub fn total_by<T>(items: &[T], field: impl Fn(&T) -> f64) -> f64 {
    items.iter().map(field).sum()
}

/// Total effort across work items, regardless of state.
pub fn total_effort(items: &[WorkItem]) -> f64 {
    total_by(items, |item| item.effort)
}

/// Total effort of Done work items only.
pub fn completed_effort(items: &[WorkItem]) -> f64 {
    items
        .iter()
        .filter(|item| item.is_done())
        .map(|item| item.effort)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WorkItemState;

    fn item(effort: f64, state: WorkItemState) -> WorkItem {
        WorkItem {
            id: "w".into(),
            title: "item".into(),
            state,
            effort,
            priority: None,
            business_value: None,
        }
    }

    #[test]
    fn test_total_effort() {
        let items = vec![
            item(3.0, WorkItemState::Done),
            item(5.0, WorkItemState::New),
            item(2.0, WorkItemState::Unknown),
        ];
        assert_eq!(total_effort(&items), 10.0);
    }

    #[test]
    fn test_total_effort_empty() {
        assert_eq!(total_effort(&[]), 0.0);
    }

    #[test]
    fn test_completed_effort_filters_done() {
        let items = vec![
            item(3.0, WorkItemState::Done),
            item(5.0, WorkItemState::New),
            item(7.0, WorkItemState::Done),
        ];
        assert_eq!(completed_effort(&items), 10.0);
    }

    #[test]
    fn test_total_by_custom_accessor() {
        let items = vec![
            WorkItem {
                id: "w1".into(),
                title: "a".into(),
                state: WorkItemState::New,
                effort: 1.0,
                priority: None,
                business_value: Some(40),
            },
            WorkItem {
                id: "w2".into(),
                title: "b".into(),
                state: WorkItemState::New,
                effort: 2.0,
                priority: None,
                business_value: Some(60),
            },
        ];
        let value = total_by(&items, |i| i.business_value.unwrap_or(0) as f64);
        assert_eq!(value, 100.0);
    }
}
