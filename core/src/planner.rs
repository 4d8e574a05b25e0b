// Copyright 2025 HEM Sp. z o.o.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use rand::seq::SliceRandom;

use crate::item::SharedItem;
use crate::surface::SurfaceId;

/// Ordered per-surface grouping of a selection, consumed once by the
/// orchestrator. Group order follows first appearance in the (possibly
/// shuffled) selection; item order within a group follows selection order.
#[derive(Debug, Clone, Default)]
pub struct AssignmentPlan {
    groups: Vec<(SurfaceId, Vec<SharedItem>)>,
}

impl AssignmentPlan {
    /// Explicit per-surface mode: wraps an upstream-built mapping, dropping
    /// groups with no items so the orchestrator never sees an empty queue.
    pub fn from_groups(groups: impl IntoIterator<Item = (SurfaceId, Vec<SharedItem>)>) -> Self {
        AssignmentPlan {
            groups: groups.into_iter().filter(|(_, items)| !items.is_empty()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn groups(&self) -> impl Iterator<Item = (&SurfaceId, &[SharedItem])> {
        self.groups.iter().map(|(id, items)| (id, items.as_slice()))
    }

    pub fn into_groups(self) -> Vec<(SurfaceId, Vec<SharedItem>)> {
        self.groups
    }

    fn push(&mut self, surface: SurfaceId, item: SharedItem) {
        match self.groups.iter_mut().find(|(id, _)| *id == surface) {
            Some((_, items)) => items.push(item),
            None => self.groups.push((surface, vec![item])),
        }
    }
}

/// Returns the selection in uniformly random order. Assignment targets are
/// untouched; only playback order changes.
pub fn shuffled(selection: &[SharedItem]) -> Vec<SharedItem> {
    let mut items = selection.to_vec();
    items.shuffle(&mut rand::rng());
    items
}

/// Groups `selection` by assigned surface, optionally shuffling first.
/// Returns `None` when any item lacks an assignment; that is a caller
/// precondition violation, not a partial result. An empty selection yields
/// an empty plan.
pub fn plan(selection: &[SharedItem], use_shuffle: bool) -> Option<AssignmentPlan> {
    let ordered = if use_shuffle { shuffled(selection) } else { selection.to_vec() };
    let mut plan = AssignmentPlan::default();
    for item in ordered {
        let Some(surface) = item.assigned_surface() else {
            return None;
        };
        plan.push(surface, item);
    }
    Some(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::VideoItem;
    use std::collections::HashMap;

    fn item(name: &str, surface: Option<&str>) -> SharedItem {
        let locator = std::env::temp_dir().join(name).to_string_lossy().into_owned();
        let item = VideoItem::new(locator);
        item.assign_surface(surface.map(SurfaceId::from));
        item
    }

    fn locators(items: &[SharedItem]) -> Vec<String> {
        items.iter().map(|i| i.locator().to_string()).collect()
    }

    #[test]
    fn empty_selection_yields_empty_plan() {
        let plan = plan(&[], false).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn unassigned_item_fails_planning() {
        let selection = vec![item("a.mp4", Some("s1")), item("b.mp4", None)];
        assert!(plan(&selection, false).is_none());
    }

    #[test]
    fn grouping_preserves_selection_order() {
        let selection = vec![
            item("a.mp4", Some("s1")),
            item("b.mp4", Some("s2")),
            item("c.mp4", Some("s1")),
        ];
        let plan = plan(&selection, false).unwrap();
        let groups = plan.into_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, SurfaceId::from("s1"));
        assert_eq!(locators(&groups[0].1), locators(&[selection[0].clone(), selection[2].clone()]));
        assert_eq!(groups[1].0, SurfaceId::from("s2"));
        assert_eq!(locators(&groups[1].1), locators(&[selection[1].clone()]));
    }

    #[test]
    fn shuffle_preserves_the_item_multiset() {
        let selection: Vec<SharedItem> =
            (0..16).map(|i| item(&format!("clip{i}.mp4"), Some("s1"))).collect();
        let plan = plan(&selection, true).unwrap();
        let groups = plan.into_groups();
        assert_eq!(groups.len(), 1);

        let mut expected: HashMap<String, usize> = HashMap::new();
        for locator in locators(&selection) {
            *expected.entry(locator).or_default() += 1;
        }
        let mut shuffled_counts: HashMap<String, usize> = HashMap::new();
        for locator in locators(&groups[0].1) {
            *shuffled_counts.entry(locator).or_default() += 1;
        }
        assert_eq!(expected, shuffled_counts);
    }

    #[test]
    fn shuffle_keeps_assignment_targets() {
        let selection = vec![
            item("a.mp4", Some("s1")),
            item("b.mp4", Some("s2")),
            item("c.mp4", Some("s2")),
        ];
        let plan = plan(&selection, true).unwrap();
        for (surface, items) in plan.groups() {
            for item in items {
                assert_eq!(item.assigned_surface().as_ref(), Some(surface));
            }
        }
    }

    #[test]
    fn explicit_mode_drops_empty_groups() {
        let plan = AssignmentPlan::from_groups(vec![
            (SurfaceId::from("s1"), vec![item("a.mp4", Some("s1"))]),
            (SurfaceId::from("s2"), Vec::new()),
        ]);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.groups().next().unwrap().0, &SurfaceId::from("s1"));
    }
}
