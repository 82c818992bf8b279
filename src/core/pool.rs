use crate::domain::model::ProjectSummary;
use crate::utils::error::{Result, TimefillError};
use rand::Rng;
use std::collections::HashSet;

/// Projects repeated once per historical entry, so a uniform draw follows
/// the historical frequency.
#[derive(Debug, Clone)]
pub struct WeightedPool<'a> {
    slots: Vec<&'a ProjectSummary>,
}

impl<'a> WeightedPool<'a> {
    pub fn build(projects: &'a [ProjectSummary], excluded: &HashSet<String>) -> Result<Self> {
        let mut slots = Vec::new();
        let mut excluded_count = 0;

        for project in projects {
            if excluded.contains(&project.project_name) {
                excluded_count += 1;
                tracing::debug!("🚫 Excluding project '{}' from sampling", project.project_name);
                continue;
            }
            slots.extend(std::iter::repeat_n(project, project.total_entries));
        }

        if slots.is_empty() {
            return Err(TimefillError::EmptyPoolError {
                excluded: excluded_count,
            });
        }

        tracing::debug!(
            "Weighted pool holds {} slots from {} projects",
            slots.len(),
            projects.len() - excluded_count
        );

        Ok(Self { slots })
    }

    pub fn draw<R: Rng>(&self, rng: &mut R) -> &'a ProjectSummary {
        self.slots[rng.random_range(0..self.slots.len())]
    }

    /// How many slots a project occupies.
    pub fn weight_of(&self, project_id: i64) -> usize {
        self.slots
            .iter()
            .filter(|p| p.project_id == project_id)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn summary(project_id: i64, name: &str, total_entries: usize) -> ProjectSummary {
        ProjectSummary {
            project_id,
            project_name: name.to_string(),
            client_name: None,
            client_id: None,
            total_hours: total_entries as f64 * 2.0,
            total_entries,
            average_entry_hours: 2.0,
        }
    }

    #[test]
    fn test_each_project_appears_once_per_entry() {
        let projects = vec![summary(1, "A", 40), summary(2, "B", 10)];
        let pool = WeightedPool::build(&projects, &HashSet::new()).unwrap();

        assert_eq!(pool.weight_of(1), 40);
        assert_eq!(pool.weight_of(2), 10);
    }

    #[test]
    fn test_excluded_projects_are_never_drawn() {
        let projects = vec![summary(1, "Keep", 5), summary(2, "Vacation", 50)];
        let excluded: HashSet<String> = ["Vacation".to_string()].into_iter().collect();
        let pool = WeightedPool::build(&projects, &excluded).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        assert_eq!(pool.weight_of(2), 0);
        for _ in 0..1_000 {
            assert_eq!(pool.draw(&mut rng).project_id, 1);
        }
    }

    #[test]
    fn test_draw_frequency_follows_entry_counts() {
        let projects = vec![summary(1, "A", 40), summary(2, "B", 10)];
        let pool = WeightedPool::build(&projects, &HashSet::new()).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts: HashMap<i64, usize> = HashMap::new();

        let draws = 50_000;
        for _ in 0..draws {
            *counts.entry(pool.draw(&mut rng).project_id).or_default() += 1;
        }

        let share_a = counts[&1] as f64 / draws as f64;
        assert!((share_a - 0.8).abs() < 0.02, "share of A was {}", share_a);
    }

    #[test]
    fn test_everything_excluded_is_an_error() {
        let projects = vec![summary(1, "Vacation", 5)];
        let excluded: HashSet<String> = ["Vacation".to_string()].into_iter().collect();

        let result = WeightedPool::build(&projects, &excluded);
        assert!(matches!(
            result,
            Err(TimefillError::EmptyPoolError { excluded: 1 })
        ));
    }

    #[test]
    fn test_no_projects_is_an_error() {
        let result = WeightedPool::build(&[], &HashSet::new());
        assert!(matches!(result, Err(TimefillError::EmptyPoolError { excluded: 0 })));
    }
}
