use std::sync::Arc;

use super::types::{Runner, WorkItem};

/// Iteration-major cross product of a [`Runner`]'s instances, users and requests.
///
/// Items are produced lazily in the order iteration → instance → user →
/// request. An empty axis yields no items at all.
#[derive(Debug, Clone)]
pub struct WorkItems {
    runner: Runner,
    iterations: u64,
    per_iteration: u64,
    next: u64,
}

impl WorkItems {
    #[must_use]
    pub fn new(runner: Runner, iterations: u64) -> Self {
        let per_iteration = runner.items_per_iteration();
        Self {
            runner,
            iterations,
            per_iteration,
            next: 0,
        }
    }

    /// Total number of items this expansion yields (`iterations * N * U * R`).
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.iterations.saturating_mul(self.per_iteration)
    }

    fn item_at(&self, ordinal: u64) -> Option<WorkItem> {
        let requests = u64::try_from(self.runner.requests.len()).ok()?;
        let users = u64::try_from(self.runner.users.len()).ok()?;
        let instances = u64::try_from(self.runner.instances.len()).ok()?;

        let iteration = ordinal.checked_div(self.per_iteration)?;
        let within = ordinal.checked_rem(self.per_iteration)?;
        let request_idx = within.checked_rem(requests)?;
        let user_idx = within.checked_div(requests)?.checked_rem(users)?;
        let instance_idx = within
            .checked_div(requests.checked_mul(users)?)?
            .checked_rem(instances)?;

        let instance = self.runner.instances.get(usize::try_from(instance_idx).ok()?)?;
        let user = self.runner.users.get(usize::try_from(user_idx).ok()?)?;
        let request = self.runner.requests.get(usize::try_from(request_idx).ok()?)?;

        Some(WorkItem {
            instance: Arc::clone(instance),
            user: Arc::clone(user),
            request: Arc::clone(request),
            iteration,
        })
    }
}

impl Iterator for WorkItems {
    type Item = WorkItem;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total() {
            return None;
        }
        let item = self.item_at(self.next)?;
        self.next = self.next.saturating_add(1);
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total().saturating_sub(self.next);
        let remaining = usize::try_from(remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for WorkItems {}

/// Expands `runner` into its work items for `iterations` passes.
#[must_use]
pub fn expand(runner: &Runner, iterations: u64) -> WorkItems {
    WorkItems::new(runner.clone(), iterations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::types::{HttpVerb, Instance, RequestTemplate, User};

    fn runner(instances: usize, users: usize, requests: usize) -> Runner {
        Runner::new(
            (0..instances)
                .map(|idx| Instance::new(format!("inst{}", idx), "http://localhost"))
                .collect(),
            (0..users)
                .map(|idx| User::new(format!("user{}", idx), "pw"))
                .collect(),
            (0..requests)
                .map(|idx| RequestTemplate::new(HttpVerb::Get, format!("/r{}", idx)))
                .collect(),
        )
    }

    #[test]
    fn yields_full_cross_product() -> Result<(), String> {
        for (iterations, n, u, r) in [(1, 1, 1, 1), (3, 2, 2, 2), (2, 3, 1, 4), (5, 1, 3, 1)] {
            let items = expand(&runner(n, u, r), iterations);
            let expected = iterations
                .saturating_mul(u64::try_from(n.saturating_mul(u).saturating_mul(r)).map_err(|err| err.to_string())?);
            if items.total() != expected {
                return Err(format!("total {} != {}", items.total(), expected));
            }
            let count = u64::try_from(items.count()).map_err(|err| err.to_string())?;
            if count != expected {
                return Err(format!("yielded {} != {}", count, expected));
            }
        }
        Ok(())
    }

    #[test]
    fn order_is_iteration_instance_user_request() -> Result<(), String> {
        let labels: Vec<String> = expand(&runner(2, 2, 2), 2)
            .map(|item| {
                format!(
                    "{}:{}:{}:{}",
                    item.iteration, item.instance.name, item.user.user_name, item.request.path
                )
            })
            .collect();
        let expected_prefix = [
            "0:inst0:user0:/r0",
            "0:inst0:user0:/r1",
            "0:inst0:user1:/r0",
            "0:inst0:user1:/r1",
            "0:inst1:user0:/r0",
        ];
        for (idx, expected) in expected_prefix.iter().enumerate() {
            if labels.get(idx).map(String::as_str) != Some(*expected) {
                return Err(format!("item {} was {:?}, expected {}", idx, labels.get(idx), expected));
            }
        }
        if labels.last().map(String::as_str) != Some("1:inst1:user1:/r1") {
            return Err(format!("Unexpected last item: {:?}", labels.last()));
        }
        Ok(())
    }

    #[test]
    fn empty_axis_yields_nothing() -> Result<(), String> {
        for (n, u, r) in [(0, 1, 1), (1, 0, 1), (1, 1, 0)] {
            let mut items = expand(&runner(n, u, r), 3);
            if items.total() != 0 || items.next().is_some() {
                return Err(format!("Expected no items for {}x{}x{}", n, u, r));
            }
        }
        if expand(&runner(1, 1, 1), 0).next().is_some() {
            return Err("Expected no items for zero iterations".to_owned());
        }
        Ok(())
    }

    #[test]
    fn items_share_inputs() -> Result<(), String> {
        let source = runner(1, 1, 1);
        let items: Vec<WorkItem> = expand(&source, 3).collect();
        let first = items.first().ok_or("missing item")?;
        let template = source.requests.first().ok_or("missing template")?;
        if !Arc::ptr_eq(&first.request, template) {
            return Err("Expected work items to share the template".to_owned());
        }
        Ok(())
    }
}
