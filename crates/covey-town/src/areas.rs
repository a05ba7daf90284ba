//! Conversation area engine: creating areas and releasing occupants.
//!
//! Membership has two sources. When an area is created, every player whose
//! current position lies strictly inside its box is seeded into it. After
//! that, only the movement pipeline changes membership, and it trusts the
//! client's conversation label instead of coordinates.

use covey_protocol::{boxes_overlap, ConversationArea, PlayerId};

use crate::listener::Notice;
use crate::{AreaRejection, Town};

impl Town {
    /// Creates a conversation area.
    ///
    /// Rejected, with no change to the town, if the label is taken, the
    /// topic is empty, or the box overlaps an existing area (checked in
    /// that order). Any occupants on `area` are discarded and recomputed
    /// from player positions. "Conversation area updated" fires once for
    /// the new area, after all occupants are in.
    ///
    /// A seeded player who was still linked to another area is released
    /// from it first, so the occupant lists stay exact.
    pub fn add_conversation_area(&mut self, mut area: ConversationArea) -> Result<(), AreaRejection> {
        if self.areas.iter().any(|a| a.label == area.label) {
            return Err(self.reject(AreaRejection::DuplicateLabel(area.label)));
        }
        if area.topic.is_empty() {
            return Err(self.reject(AreaRejection::EmptyTopic));
        }
        if let Some(existing) = self
            .areas
            .iter()
            .find(|a| boxes_overlap(&a.bounding_box, &area.bounding_box))
        {
            let label = existing.label.clone();
            return Err(self.reject(AreaRejection::Overlaps(label)));
        }

        area.occupants_by_id.clear();
        let inside: Vec<(PlayerId, Option<String>)> = self
            .players
            .iter()
            .filter(|p| p.is_within(&area))
            .map(|p| (p.id, p.active_conversation_area.clone()))
            .collect();
        let label = area.label.clone();
        self.areas.push(area);

        for (player_id, previous) in inside {
            if let Some(previous) = previous {
                self.remove_player_from_conversation_area(player_id, &previous);
            }
            if let Some(player) = self.player_mut(player_id) {
                player.active_conversation_area = Some(label.clone());
            }
            if let Some(area) = self.areas.iter_mut().find(|a| a.label == label) {
                area.occupants_by_id.push(player_id);
            }
        }

        if let Some(area) = self.areas.iter().find(|a| a.label == label) {
            tracing::info!(
                town_id = %self.town_id(),
                label = %area.label,
                occupants = area.occupants_by_id.len(),
                "conversation area created"
            );
            self.listeners.notify(Notice::AreaUpdated(area));
        }
        Ok(())
    }

    /// Takes a player out of an area's occupant list.
    ///
    /// If the area is left empty it is removed and "conversation area
    /// destroyed" fires; otherwise "conversation area updated" fires.
    /// An unknown label is ignored.
    ///
    /// The player's `active_conversation_area` is NOT touched: callers own
    /// that link, which lets both the disconnect and the movement paths
    /// share this routine.
    pub fn remove_player_from_conversation_area(&mut self, player_id: PlayerId, label: &str) {
        let Some(pos) = self.areas.iter().position(|a| a.label == label) else {
            return;
        };
        let Some(area) = self.areas.get_mut(pos) else {
            return;
        };
        area.occupants_by_id.retain(|id| *id != player_id);

        if !area.occupants_by_id.is_empty() {
            self.listeners.notify(Notice::AreaUpdated(&*area));
            return;
        }

        let area = self.areas.remove(pos);
        tracing::info!(
            town_id = %self.town_id(),
            label = %area.label,
            "conversation area destroyed"
        );
        self.listeners.notify(Notice::AreaDestroyed(&area));
    }

    fn reject(&self, reason: AreaRejection) -> AreaRejection {
        tracing::debug!(town_id = %self.town_id(), %reason, "conversation area rejected");
        reason
    }
}

#[cfg(test)]
mod tests {
    use covey_protocol::{Player, UserLocation};

    use crate::town::tests::*;
    use crate::TownEvent;

    use super::*;

    // =====================================================================
    // Validation
    // =====================================================================

    #[test]
    fn test_add_conversation_area_duplicate_label_rejected() {
        let mut town = town();
        town.add_conversation_area(area("A", 10.0, 10.0, 5.0, 5.0)).unwrap();

        let result = town.add_conversation_area(area("A", 50.0, 50.0, 5.0, 5.0));

        assert_eq!(result, Err(AreaRejection::DuplicateLabel("A".into())));
        assert_eq!(town.conversation_areas().len(), 1);
        assert_eq!(town.conversation_area("A").unwrap().bounding_box.x, 10.0);
    }

    #[test]
    fn test_add_conversation_area_empty_topic_rejected() {
        let (mut town, rec) = town_with_recorder();
        let mut bad = area("A", 10.0, 10.0, 5.0, 5.0);
        bad.topic.clear();

        let result = town.add_conversation_area(bad);

        assert_eq!(result, Err(AreaRejection::EmptyTopic));
        assert!(town.conversation_areas().is_empty());
        assert!(rec.take().is_empty());
    }

    #[test]
    fn test_add_conversation_area_overlapping_box_rejected() {
        let mut town = town();
        town.add_conversation_area(area("A", 10.0, 10.0, 10.0, 10.0)).unwrap();

        let result = town.add_conversation_area(area("B", 15.0, 15.0, 10.0, 10.0));

        assert_eq!(result, Err(AreaRejection::Overlaps("A".into())));
        assert!(town.conversation_area("B").is_none());
    }

    #[test]
    fn test_add_conversation_area_touching_box_accepted() {
        let mut town = town();
        town.add_conversation_area(area("A", 10.0, 10.0, 10.0, 10.0)).unwrap();

        let result = town.add_conversation_area(area("B", 20.0, 10.0, 10.0, 10.0));

        assert!(result.is_ok());
        assert_eq!(town.conversation_areas().len(), 2);
    }

    #[test]
    fn test_add_conversation_area_checks_label_before_overlap() {
        let mut town = town();
        town.add_conversation_area(area("A", 10.0, 10.0, 10.0, 10.0)).unwrap();

        let result = town.add_conversation_area(area("A", 10.0, 10.0, 10.0, 10.0));

        assert!(matches!(result, Err(AreaRejection::DuplicateLabel(_))));
    }

    #[test]
    fn test_add_conversation_area_rejection_leaves_players_untouched() {
        let (mut town, rec) = town_with_recorder();
        join_at(&mut town, 1, 15.0, 15.0);
        town.add_conversation_area(area("B", 15.0, 15.0, 2.0, 2.0)).unwrap();
        rec.take();

        let result = town.add_conversation_area(area("C", 15.5, 15.5, 2.0, 2.0));

        assert!(result.is_err());
        assert!(rec.take().is_empty());
        assert_eq!(town.conversation_areas().len(), 1);
        let player = town.player(pid(1)).unwrap();
        assert_eq!(player.active_conversation_area.as_deref(), Some("B"));
    }

    // =====================================================================
    // Occupant seeding
    // =====================================================================

    #[test]
    fn test_add_conversation_area_seeds_player_inside_box() {
        let (mut town, rec) = town_with_recorder();
        join_at(&mut town, 1, 10.0, 10.0);
        rec.take();

        town.add_conversation_area(area("A", 10.0, 10.0, 5.0, 5.0)).unwrap();

        let player = town.player(pid(1)).unwrap();
        assert_eq!(player.active_conversation_area.as_deref(), Some("A"));
        assert_eq!(town.conversation_area("A").unwrap().occupants_by_id, vec![pid(1)]);
        let events = rec.take();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            TownEvent::ConversationAreaUpdated(a) if a.occupants_by_id == vec![pid(1)]
        ));
    }

    #[test]
    fn test_add_conversation_area_skips_players_on_border_or_outside() {
        let mut town = town();
        join_at(&mut town, 1, 7.5, 10.0);
        join_at(&mut town, 2, 40.0, 40.0);
        join_at(&mut town, 3, 11.0, 9.0);

        town.add_conversation_area(area("A", 10.0, 10.0, 5.0, 5.0)).unwrap();

        assert_eq!(town.conversation_area("A").unwrap().occupants_by_id, vec![pid(3)]);
        assert!(town.player(pid(1)).unwrap().active_conversation_area.is_none());
        assert!(town.player(pid(2)).unwrap().active_conversation_area.is_none());
    }

    #[test]
    fn test_add_conversation_area_fires_single_update_for_batch() {
        let (mut town, rec) = town_with_recorder();
        for id in 1..=4 {
            join_at(&mut town, id, 10.0 + id as f64 * 0.1, 10.0);
        }
        rec.take();

        town.add_conversation_area(area("A", 10.0, 10.0, 5.0, 5.0)).unwrap();

        let events = rec.take();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            TownEvent::ConversationAreaUpdated(a) if a.occupants_by_id.len() == 4
        ));
    }

    #[test]
    fn test_add_conversation_area_discards_caller_occupants() {
        let mut town = town();
        let mut proposed = area("A", 10.0, 10.0, 5.0, 5.0);
        proposed.occupants_by_id = vec![pid(7), pid(8)];
        join_at(&mut town, 1, 10.0, 10.0);

        town.add_conversation_area(proposed).unwrap();

        assert_eq!(town.conversation_area("A").unwrap().occupants_by_id, vec![pid(1)]);
    }

    #[test]
    fn test_add_conversation_area_with_no_players_inside_is_stored() {
        // An area created empty is kept until someone enters and leaves.
        let mut town = town();

        town.add_conversation_area(area("A", 10.0, 10.0, 5.0, 5.0)).unwrap();

        assert!(town.conversation_area("A").unwrap().occupants_by_id.is_empty());
    }

    #[test]
    fn test_add_conversation_area_moves_player_off_stale_area() {
        let (mut town, rec) = town_with_recorder();
        join(&mut town, 1);
        join_at(&mut town, 2, 30.0, 30.0);
        town.add_conversation_area(area("Old", 30.0, 30.0, 4.0, 4.0)).unwrap();
        // Player 1 claims "Old" by label while standing somewhere else.
        town.update_player_location(pid(1), UserLocation::at(80.0, 80.0).in_conversation("Old"))
            .unwrap();
        rec.take();

        town.add_conversation_area(area("New", 80.0, 80.0, 4.0, 4.0)).unwrap();

        assert_eq!(town.conversation_area("Old").unwrap().occupants_by_id, vec![pid(2)]);
        assert_eq!(town.conversation_area("New").unwrap().occupants_by_id, vec![pid(1)]);
        let events = rec.take();
        assert!(matches!(&events[0], TownEvent::ConversationAreaUpdated(a) if a.label == "Old"));
        assert!(matches!(&events[1], TownEvent::ConversationAreaUpdated(a) if a.label == "New"));
        assert_invariants(&town);
    }

    // =====================================================================
    // remove_player_from_conversation_area()
    // =====================================================================

    #[test]
    fn test_remove_player_last_occupant_destroys_area() {
        let (mut town, rec) = town_with_recorder();
        join_at(&mut town, 1, 10.0, 10.0);
        town.add_conversation_area(area("A", 10.0, 10.0, 5.0, 5.0)).unwrap();
        rec.take();

        town.remove_player_from_conversation_area(pid(1), "A");

        assert!(town.conversation_area("A").is_none());
        let events = rec.take();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            TownEvent::ConversationAreaDestroyed(a) if a.occupants_by_id.is_empty()
        ));
    }

    #[test]
    fn test_remove_player_does_not_touch_player_link() {
        let mut town = town();
        join_at(&mut town, 1, 10.0, 10.0);
        join_at(&mut town, 2, 11.0, 10.0);
        town.add_conversation_area(area("A", 10.0, 10.0, 5.0, 5.0)).unwrap();

        town.remove_player_from_conversation_area(pid(1), "A");

        assert_eq!(town.conversation_area("A").unwrap().occupants_by_id, vec![pid(2)]);
        assert_eq!(
            town.player(pid(1)).unwrap().active_conversation_area.as_deref(),
            Some("A")
        );
    }

    #[test]
    fn test_remove_player_unknown_label_is_noop() {
        let (mut town, rec) = town_with_recorder();

        town.remove_player_from_conversation_area(pid(1), "missing");

        assert!(rec.take().is_empty());
    }

    #[test]
    fn test_remove_player_not_in_area_keeps_other_occupants() {
        let mut town = town();
        join_at(&mut town, 1, 10.0, 10.0);
        town.add_conversation_area(area("A", 10.0, 10.0, 5.0, 5.0)).unwrap();
        town.begin_join(Player::new(pid(9), "stranger")).unwrap();

        town.remove_player_from_conversation_area(pid(9), "A");

        assert_eq!(town.conversation_area("A").unwrap().occupants_by_id, vec![pid(1)]);
    }

    #[test]
    fn test_areas_never_overlap_after_many_attempts() {
        let mut town = town();
        for i in 0..10 {
            for j in 0..10 {
                let label = format!("{i}-{j}");
                let _ = town.add_conversation_area(area(
                    &label,
                    i as f64 * 3.0,
                    j as f64 * 3.0,
                    4.0 + (i % 3) as f64,
                    4.0 + (j % 2) as f64,
                ));
            }
        }

        let areas = town.conversation_areas();
        assert!(!areas.is_empty());
        for a in areas {
            for b in areas {
                if a.label != b.label {
                    assert!(!boxes_overlap(&a.bounding_box, &b.bounding_box));
                }
            }
        }
    }
}
