#[cfg(test)]
mod tests {
    use crate::battle::presentation::SoundCue;
    use crate::battle::state::{
        BattleRng, EncounterKind, EncounterOutcome, Input, Phase, TrainerParty,
    };
    use crate::battle::tests::common::{assert_ok, bundled_catalog, roster_with, TestAgentBuilder, TestHarness};
    use crate::roster::RosterAccess;
    use pretty_assertions::assert_eq;
    use schema::StatKind;

    /// A one-vitality Promptling leads; the wild Tokenite is faster and knocks it out.
    fn doomed_lead(with_backup: bool, rolls: Vec<f64>) -> TestHarness {
        let catalog = bundled_catalog();
        let mut party = vec![TestAgentBuilder::new("promptling", 3)
            .with_vitality(1)
            .build(&catalog)];
        if with_backup {
            party.push(TestAgentBuilder::new("sparky", 10).build(&catalog));
        }
        TestHarness::new(catalog, roster_with(party, &[]), BattleRng::new_for_test(rolls))
    }

    fn tokenite(harness: &TestHarness, level: u8) -> crate::agent::AgentInst {
        TestAgentBuilder::new("tokenite", level)
            .with_moves(&["hello_world"])
            .wild()
            .build(&harness.catalog)
    }

    #[test]
    fn test_forced_switch_after_a_faint() {
        // Turn: enemy jitter, accuracy, damage. Free move after the switch: the same again.
        let mut harness = doomed_lead(true, vec![0.5, 0.0, 0.5, 0.5, 0.0, 0.5]);
        let opponent = tokenite(&harness, 10);
        let mut encounter = assert_ok(harness.start(opponent, EncounterKind::Wild));
        harness.skip_intro(&mut encounter);

        harness.press(&mut encounter, &[Input::Confirm, Input::Confirm]);
        assert_eq!(encounter.current_message(), Some("Wild Tokenite used Hello World!"));
        harness.confirm_messages(&mut encounter);

        assert!(harness.sink.contains_message("Promptling hallucinated into oblivion!"));
        assert!(harness.sink.contains_message("Send out another agent?"));
        assert!(harness.sink.sounds.contains(&SoundCue::Faint));
        assert_eq!(encounter.phase(), Phase::Switch);

        // The fainted lead cannot stay out.
        harness.press(&mut encounter, &[Input::Cancel]);
        assert_eq!(encounter.phase(), Phase::Switch);

        harness.press(&mut encounter, &[Input::Confirm]);
        assert_eq!(encounter.current_message(), Some("Promptling has no context left!"));
        harness.press(&mut encounter, &[Input::Confirm]);
        assert_eq!(encounter.phase(), Phase::Switch);

        harness.press(&mut encounter, &[Input::Down, Input::Confirm]);
        assert_eq!(encounter.current_message(), Some("Go! Sparky!"));
        assert_eq!(encounter.player_index(), 1);

        harness.press(&mut encounter, &[Input::Confirm]);
        assert_eq!(encounter.current_message(), Some("Wild Tokenite used Hello World!"));
        harness.confirm_messages(&mut encounter);

        assert_eq!(encounter.phase(), Phase::Menu);
        assert!(encounter.is_active());
        let sparky = &harness.roster.party()[1];
        assert!(sparky.vitality() < sparky.max_vitality());
        assert_eq!(harness.rng.remaining(), Some(0));
    }

    #[test]
    fn test_last_agent_down_blacks_out() {
        let mut harness = doomed_lead(false, vec![0.5, 0.0, 0.5]);
        let opponent = tokenite(&harness, 10);
        let mut encounter = assert_ok(harness.start(opponent, EncounterKind::Wild));
        harness.skip_intro(&mut encounter);
        if let Some(lead) = harness.roster.party_member_mut(0) {
            lead.change_stat_stage(StatKind::Processing, 2);
        }

        harness.press(&mut encounter, &[Input::Confirm, Input::Confirm]);
        let outcome = harness.confirm_messages(&mut encounter);

        assert_eq!(outcome, Some(EncounterOutcome::Lost));
        assert_eq!(encounter.phase(), Phase::Lose);
        assert_eq!(
            harness.sink.messages.last().map(String::as_str),
            Some("All your agents have hallucinated! You blacked out...")
        );
        assert_eq!(harness.roster.party()[0].stat_stage(StatKind::Processing), 0);
    }

    #[test]
    fn test_wild_knockout_wins_and_awards_xp() {
        let catalog = bundled_catalog();
        let player = TestAgentBuilder::new("sparky", 10)
            .with_moves(&["compile"])
            .build(&catalog);
        let opponent = TestAgentBuilder::new("tokenite", 2)
            .with_moves(&["hello_world"])
            .with_vitality(1)
            .wild()
            .build(&catalog);
        // Enemy jitter, then the player's accuracy and damage. Sparky is faster.
        let mut harness = TestHarness::new(
            catalog,
            roster_with(vec![player], &[]),
            BattleRng::new_for_test(vec![0.5, 0.0, 0.5]),
        );
        let mut encounter = assert_ok(harness.start(opponent, EncounterKind::Wild));
        harness.skip_intro(&mut encounter);

        harness.press(&mut encounter, &[Input::Confirm, Input::Confirm]);
        let outcome = harness.confirm_messages(&mut encounter);

        assert_eq!(outcome, Some(EncounterOutcome::Won));
        assert_eq!(encounter.phase(), Phase::Win);
        assert!(harness.sink.contains_message("Wild Tokenite hallucinated into oblivion!"));
        assert!(harness.sink.contains_message("Sparky gained 15 XP!"));
        assert_eq!(harness.roster.party()[0].xp, 15);
        assert_eq!(harness.roster.party()[0].moves()[0].pp(), 24);
    }

    #[test]
    fn test_double_faint_handles_the_defender_first() {
        let catalog = bundled_catalog();
        let mut player = TestAgentBuilder::new("sparky", 10)
            .with_moves(&["hello_world"])
            .with_vitality(1)
            .build(&catalog);
        if let Some(slot) = player.move_slot_mut(0) {
            slot.set_pp(0);
        }
        let lead = TestAgentBuilder::new("tokenite", 2)
            .with_moves(&["hello_world"])
            .with_vitality(1)
            .build(&catalog);
        let reserve = TestAgentBuilder::new("datum", 3).build(&catalog);
        let kind = EncounterKind::Trainer(TrainerParty {
            name: "Ada".to_string(),
            reserves: vec![reserve],
        });
        // Enemy jitter, then Struggle's accuracy, damage and recoil rolls.
        // Seventeen damage knocks the lead out and the recoil of four takes Sparky with it.
        let rng = BattleRng::new_for_test(vec![0.5, 0.0, 0.5, 0.0]);
        let mut harness = TestHarness::new(catalog, roster_with(vec![player], &[]), rng);
        let mut encounter = assert_ok(harness.start(lead, kind));
        harness.skip_intro(&mut encounter);

        harness.press(&mut encounter, &[Input::Confirm]);
        assert_eq!(encounter.current_message(), Some("Sparky has no tokens left!"));
        for _ in 0..10 {
            if encounter.current_message() == Some("Ada sent out Datum!") {
                break;
            }
            harness.press(&mut encounter, &[Input::Confirm]);
        }
        assert_eq!(encounter.current_message(), Some("Ada sent out Datum!"));
        assert_eq!(encounter.phase(), Phase::Message);
        assert_eq!(encounter.stage(), Phase::SendOut);
        assert_eq!(encounter.enemy().nickname, "Datum");

        let outcome = harness.confirm_messages(&mut encounter);
        assert_eq!(outcome, Some(EncounterOutcome::Lost));

        let messages = &harness.sink.messages;
        let at = |line: &str| messages.iter().position(|message| message == line);
        let order = [
            at("Sparky took recoil damage!"),
            at("Tokenite hallucinated into oblivion!"),
            at("Ada sent out Datum!"),
            at("Sparky hallucinated into oblivion!"),
            at("All your agents have hallucinated! You blacked out..."),
        ];
        assert!(order.iter().all(Option::is_some), "{messages:#?}");
        assert!(order.windows(2).all(|pair| pair[0] < pair[1]), "{order:?}");
        assert!(!messages.iter().any(|line| line.contains("gained")));
        assert_eq!(harness.rng.remaining(), Some(0));
    }
}
