#[cfg(test)]
mod tests {
    use crate::battle::presentation::{AnimationCue, SoundCue};
    use crate::battle::state::{BattleRng, EncounterKind, EncounterOutcome, Input, Phase, TrainerParty};
    use crate::battle::tests::common::{assert_ok, bundled_catalog, roster_with, TestAgentBuilder, TestHarness};
    use crate::roster::{Roster, RosterAccess};
    use pretty_assertions::assert_eq;
    use schema::{ItemId, SpeciesId};

    fn open_bag_and_throw(harness: &mut TestHarness, encounter: &mut crate::battle::engine::Encounter) {
        harness.skip_intro(encounter);
        harness.press(encounter, &[Input::Right, Input::Confirm]);
        assert_eq!(encounter.phase(), Phase::Bag);
        harness.press(encounter, &[Input::Confirm]);
    }

    #[test]
    fn test_guaranteed_capture_joins_the_party() {
        let catalog = bundled_catalog();
        let player = TestAgentBuilder::new("sparky", 10).build(&catalog);
        let opponent = TestAgentBuilder::new("tokenite", 5).wild().build(&catalog);
        // A guaranteed rate draws nothing.
        let mut harness = TestHarness::new(
            catalog,
            roster_with(vec![player], &[("open_source", 1)]),
            BattleRng::new_for_test(vec![]),
        );
        let mut encounter = assert_ok(harness.start(opponent, EncounterKind::Wild));
        open_bag_and_throw(&mut harness, &mut encounter);

        assert_eq!(
            encounter.current_message(),
            Some("You threw a Open Source License!")
        );
        assert!(harness.roster.bag().is_empty());
        harness.press(&mut encounter, &[Input::Confirm]);
        assert_eq!(encounter.phase(), Phase::Catch);

        harness.sink.clear();
        harness.press(&mut encounter, &[Input::Idle; 4]);
        assert_eq!(encounter.phase(), Phase::Catch);
        assert_eq!(harness.sink.animations, vec![AnimationCue::CaptureShake; 4]);

        harness.press(&mut encounter, &[Input::Idle]);
        assert_eq!(encounter.current_message(), Some("Gotcha! Tokenite was captured!"));
        assert_eq!(harness.sink.sounds, vec![SoundCue::Capture]);

        harness.press(&mut encounter, &[Input::Confirm]);
        assert_eq!(encounter.current_message(), Some("Tokenite was added to your team!"));
        harness.press(&mut encounter, &[Input::Confirm]);
        assert_eq!(encounter.current_message(), Some("Sparky gained 19 XP!"));

        let outcome = harness.confirm_messages(&mut encounter);
        assert_eq!(outcome, Some(EncounterOutcome::Won));

        let party = harness.roster.party();
        assert_eq!(party.len(), 2);
        assert!(!party[1].is_wild);
        assert_eq!(party[1].species, SpeciesId::new("tokenite"));
        assert_eq!(party[0].xp, 19);
        assert!(harness.roster.dex_entry(&SpeciesId::new("tokenite")).caught);
    }

    #[test]
    fn test_failed_capture_gives_a_free_move() {
        let catalog = bundled_catalog();
        let player = TestAgentBuilder::new("sparky", 10).build(&catalog);
        let opponent = TestAgentBuilder::new("sparky", 5).wild().build(&catalog);
        // Rate 15: a 0.5 roll gives no shakes. Then two move jitters, accuracy, damage.
        let mut harness = TestHarness::new(
            catalog,
            roster_with(vec![player], &[("free_tier_key", 2)]),
            BattleRng::new_for_test(vec![0.5, 0.0, 0.0, 0.0, 0.5]),
        );
        let mut encounter = assert_ok(harness.start(opponent, EncounterKind::Wild));
        open_bag_and_throw(&mut harness, &mut encounter);
        harness.press(&mut encounter, &[Input::Confirm]);

        harness.press(&mut encounter, &[Input::Idle]);
        assert_eq!(encounter.phase(), Phase::Catch);
        harness.press(&mut encounter, &[Input::Idle]);
        assert_eq!(encounter.current_message(), Some("Oh no! Sparky broke free!"));
        assert!(harness.sink.sounds.contains(&SoundCue::CaptureFail));

        harness.press(&mut encounter, &[Input::Confirm]);
        let line = encounter.current_message().unwrap_or_default().to_string();
        assert!(line.starts_with("Wild Sparky used "), "{line}");
        harness.confirm_messages(&mut encounter);

        assert_eq!(encounter.phase(), Phase::Menu);
        assert_eq!(harness.roster.item_count(&ItemId::new("free_tier_key")), 1);
        assert_eq!(harness.roster.party().len(), 1);
        assert!(harness.roster.dex_entry(&SpeciesId::new("sparky")).seen);
        assert_eq!(harness.rng.remaining(), Some(0));
    }

    #[test]
    fn test_trainer_agents_cannot_be_captured() {
        let catalog = bundled_catalog();
        let player = TestAgentBuilder::new("sparky", 10).build(&catalog);
        let opponent = TestAgentBuilder::new("datum", 5).build(&catalog);
        let mut harness = TestHarness::new(
            catalog,
            roster_with(vec![player], &[("open_source", 1)]),
            BattleRng::new_for_test(vec![]),
        );
        let kind = EncounterKind::Trainer(TrainerParty {
            name: "Ada".to_string(),
            reserves: Vec::new(),
        });
        let mut encounter = assert_ok(harness.start(opponent, kind));
        open_bag_and_throw(&mut harness, &mut encounter);

        assert_eq!(encounter.current_message(), Some("Can't capture a trainer's agent!"));
        harness.press(&mut encounter, &[Input::Confirm]);
        assert_eq!(encounter.phase(), Phase::Bag);
        assert_eq!(harness.roster.item_count(&ItemId::new("open_source")), 1);
    }

    #[test]
    fn test_capture_with_a_full_party_goes_to_storage() {
        let catalog = bundled_catalog();
        let player = TestAgentBuilder::new("sparky", 10).build(&catalog);
        let opponent = TestAgentBuilder::new("tokenite", 5).wild().build(&catalog);
        let mut roster = Roster::with_party_capacity(1);
        roster.add_agent(player);
        roster.add_item(ItemId::new("open_source"), 1);
        let mut harness = TestHarness::new(catalog, roster, BattleRng::new_for_test(vec![]));
        let mut encounter = assert_ok(harness.start(opponent, EncounterKind::Wild));
        open_bag_and_throw(&mut harness, &mut encounter);

        harness.press(&mut encounter, &[Input::Confirm]);
        harness.press(&mut encounter, &[Input::Idle; 5]);
        harness.press(&mut encounter, &[Input::Confirm]);
        assert_eq!(encounter.current_message(), Some("Tokenite was sent to the Server!"));

        let outcome = harness.confirm_messages(&mut encounter);
        assert_eq!(outcome, Some(EncounterOutcome::Won));
        assert_eq!(harness.roster.party().len(), 1);
        assert_eq!(harness.roster.storage().len(), 1);
        assert_eq!(harness.roster.party()[0].xp, 0);
    }
}
