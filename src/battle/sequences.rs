//! What happens once a batch of narration has been read.
//!
//! Each [`Resume`] value names the next step of a multi-message sequence
//! (fainting, experience, learning, evolution, capture, defeat). The
//! encounter holds at most one at a time and runs it on the Confirm that
//! finishes the current batch.

use crate::battle::engine::{BattleContext, Encounter, LearnState, LEARN_DECLINE};
use crate::battle::presentation::SoundCue;
use crate::battle::state::{BattleEvent, EncounterKind, EncounterOutcome, Phase, Side};
use crate::errors::{BattleResult, BattleStateError};
use crate::progression::RewardCalculator;
use crate::roster::CaptureDestination;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Where progression goes once every level, move and evolution is settled.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterProgression {
    /// A defeated opponent: the trainer's next reserve, or victory.
    NextOpponentOrWin,
    /// A capture into the party: victory.
    EndWon,
}

/// The pending continuation of a message batch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Resume {
    /// After the opponent is announced: send out the player's agent.
    IntroSendOut,
    /// Back to the main menu with the cursor on Fight.
    ToMenu,
    /// Back to a selection phase, cursors untouched.
    BackTo(Phase),
    EnemyFreeMove,
    HandleFaint(Side),
    AwardDefeatXp,
    AwardCaptureXp,
    ApplyXp { amount: u32, after: AfterProgression },
    NextLearnMove { after: AfterProgression },
    EnterLearnMove,
    ApplyEvolution { after: AfterProgression },
    Progressed(AfterProgression),
    AfterSendOut,
    CaptureShakes,
    StoreCaptured,
    AfterPlayerFaint,
    End(EncounterOutcome),
}

impl Encounter {
    pub(super) fn resume(&mut self, resume: Resume, ctx: &mut BattleContext) -> BattleResult<()> {
        debug!(?resume, "resuming");
        match resume {
            Resume::IntroSendOut => {
                let agent = self.active_agent(ctx.roster)?.nickname.clone();
                self.narrate(Phase::Intro, [BattleEvent::SentOut { agent }], Resume::ToMenu, ctx)
            }
            Resume::ToMenu => {
                self.cursors.menu = 0;
                self.enter(Phase::Menu);
                Ok(())
            }
            Resume::BackTo(phase) => {
                self.enter(phase);
                Ok(())
            }
            Resume::EnemyFreeMove => {
                // A double faint can leave the opponent down when a replacement comes in.
                if self.enemy.is_fainted() {
                    return self.resume(Resume::HandleFaint(Side::Enemy), ctx);
                }
                self.enemy_free_move(ctx)
            }
            Resume::HandleFaint(side) => self.handle_faint(side, ctx),
            Resume::AwardDefeatXp => {
                // Both sides went down: nobody is left standing to earn it.
                if self.active_agent(ctx.roster)?.is_fainted() {
                    return self.resume(Resume::Progressed(AfterProgression::NextOpponentOrWin), ctx);
                }
                let amount = RewardCalculator.experience_for_defeating(&self.enemy, ctx.catalog)?;
                self.announce_xp(amount, AfterProgression::NextOpponentOrWin, ctx)
            }
            Resume::AwardCaptureXp => {
                let amount = RewardCalculator.experience_for_capture(
                    &self.enemy,
                    ctx.catalog,
                    ctx.config.capture_xp_share,
                )?;
                self.announce_xp(amount, AfterProgression::EndWon, ctx)
            }
            Resume::ApplyXp { amount, after } => self.apply_xp(amount, after, ctx),
            Resume::NextLearnMove { after } => self.next_learn_move(after, ctx),
            Resume::EnterLearnMove => {
                self.cursors.learn = 0;
                self.enter(Phase::LearnMove);
                Ok(())
            }
            Resume::ApplyEvolution { after } => {
                let into = self.pending_evolution.take().ok_or_else(|| {
                    BattleStateError::InconsistentState("evolution applied twice".into())
                })?;
                RewardCalculator.evolve(self.active_agent_mut(ctx.roster)?, &into, ctx.catalog)?;
                self.resume(Resume::Progressed(after), ctx)
            }
            Resume::Progressed(after) => self.after_progression(after, ctx),
            Resume::AfterSendOut => {
                if self.active_agent(ctx.roster)?.is_fainted() {
                    self.resume(Resume::HandleFaint(Side::Player), ctx)
                } else {
                    self.resume(Resume::ToMenu, ctx)
                }
            }
            Resume::CaptureShakes => {
                self.enter(Phase::Catch);
                Ok(())
            }
            Resume::StoreCaptured => self.store_captured(ctx),
            Resume::AfterPlayerFaint => self.after_player_faint(ctx),
            Resume::End(outcome) => {
                self.finish(outcome, ctx);
                Ok(())
            }
        }
    }

    fn handle_faint(&mut self, side: Side, ctx: &mut BattleContext) -> BattleResult<()> {
        ctx.sink.play_sound(SoundCue::Faint);
        match side {
            Side::Enemy => {
                let agent = if self.kind.is_trainer() {
                    self.enemy.nickname.clone()
                } else {
                    format!("Wild {}", self.enemy.nickname)
                };
                info!(%agent, "opponent fainted");
                self.narrate(Phase::Faint, [BattleEvent::Fainted { agent }], Resume::AwardDefeatXp, ctx)
            }
            Side::Player => {
                let agent = self.active_agent(ctx.roster)?.nickname.clone();
                info!(%agent, "player agent fainted");
                self.narrate(
                    Phase::Faint,
                    [BattleEvent::Fainted { agent }],
                    Resume::AfterPlayerFaint,
                    ctx,
                )
            }
        }
    }

    fn after_player_faint(&mut self, ctx: &mut BattleContext) -> BattleResult<()> {
        let survivors = ctx.roster.party().iter().any(|agent| !agent.is_fainted());
        if survivors {
            self.cursors.switch = 0;
            self.narrate(
                Phase::Switch,
                [BattleEvent::SendOutAnother],
                Resume::BackTo(Phase::Switch),
                ctx,
            )
        } else {
            self.narrate(
                Phase::Lose,
                [BattleEvent::BlackedOut],
                Resume::End(EncounterOutcome::Lost),
                ctx,
            )
        }
    }

    fn announce_xp(
        &mut self,
        amount: u32,
        after: AfterProgression,
        ctx: &mut BattleContext,
    ) -> BattleResult<()> {
        let agent = self.active_agent(ctx.roster)?.nickname.clone();
        self.narrate(
            Phase::Xp,
            [BattleEvent::ExperienceGained { agent, amount }],
            Resume::ApplyXp { amount, after },
            ctx,
        )
    }

    fn apply_xp(
        &mut self,
        amount: u32,
        after: AfterProgression,
        ctx: &mut BattleContext,
    ) -> BattleResult<()> {
        let catalog = ctx.catalog;
        let agent = self.active_agent_mut(ctx.roster)?;
        let report = RewardCalculator.apply_experience(agent, amount, catalog)?;
        let name = agent.nickname.clone();

        self.pending_moves.extend(report.pending_moves.iter().cloned());
        if report.evolution.is_some() {
            self.pending_evolution = report.evolution.clone();
        }

        let mut events = Vec::new();
        for gained in &report.levels {
            events.push(BattleEvent::LevelUp {
                agent: name.clone(),
                level: gained.level,
            });
            for move_id in &gained.learned {
                events.push(BattleEvent::MoveLearned {
                    agent: name.clone(),
                    move_name: catalog.move_data(move_id)?.name.clone(),
                });
            }
        }

        if report.leveled_up() {
            ctx.sink.play_sound(SoundCue::LevelUp);
        }
        self.narrate(Phase::LevelUp, events, Resume::NextLearnMove { after }, ctx)
    }

    /// Offers the next queued move, or moves on to evolution once the queue is empty.
    fn next_learn_move(&mut self, after: AfterProgression, ctx: &mut BattleContext) -> BattleResult<()> {
        let agent = self.active_agent(ctx.roster)?.nickname.clone();

        if let Some(move_id) = self.pending_moves.pop_front() {
            let move_name = ctx.catalog.move_data(&move_id)?.name.clone();
            self.learning = Some(LearnState { move_id, after });
            return self.narrate(
                Phase::LearnMove,
                [
                    BattleEvent::WantsToLearn {
                        agent: agent.clone(),
                        move_name: move_name.clone(),
                    },
                    BattleEvent::AlreadyKnowsFour { agent },
                    BattleEvent::ForgetPrompt { move_name },
                ],
                Resume::EnterLearnMove,
                ctx,
            );
        }

        if let Some(into) = &self.pending_evolution {
            let species_name = ctx.catalog.species(into)?.name.clone();
            ctx.sink.play_sound(SoundCue::Evolution);
            return self.narrate(
                Phase::Evolution,
                [
                    BattleEvent::Evolving {
                        agent: agent.clone(),
                    },
                    BattleEvent::EvolvedInto {
                        agent,
                        species_name,
                    },
                ],
                Resume::ApplyEvolution { after },
                ctx,
            );
        }

        self.resume(Resume::Progressed(after), ctx)
    }

    /// Resolves the learn-move prompt. `choice` is a cursor position, or None on Cancel.
    pub(super) fn settle_learn_move(
        &mut self,
        choice: Option<usize>,
        ctx: &mut BattleContext,
    ) -> BattleResult<()> {
        let LearnState { move_id, after } = self.learning.take().ok_or_else(|| {
            BattleStateError::InconsistentState("learn-move prompt without a move".into())
        })?;
        let catalog = ctx.catalog;
        let move_name = catalog.move_data(&move_id)?.name.clone();
        let agent = self.active_agent_mut(ctx.roster)?;
        let name = agent.nickname.clone();

        let slot = choice.filter(|slot| *slot != LEARN_DECLINE && *slot < agent.moves().len());
        let events = match slot {
            Some(slot) => {
                let forgotten = RewardCalculator
                    .replace_move(agent, slot, &move_id, catalog)?
                    .ok_or_else(|| {
                        BattleStateError::InconsistentState(format!("move slot {slot} is empty"))
                    })?;
                info!(agent = %name, forgot = %forgotten, learned = %move_id, "move replaced");
                vec![
                    BattleEvent::ForgetCountdown,
                    BattleEvent::MoveForgotten {
                        agent: name,
                        old_move: catalog.move_data(&forgotten)?.name.clone(),
                    },
                    BattleEvent::LearnedReplacement { move_name },
                ]
            }
            None => vec![BattleEvent::DidNotLearn {
                agent: name,
                move_name,
            }],
        };
        self.narrate(Phase::LearnMove, events, Resume::NextLearnMove { after }, ctx)
    }

    fn after_progression(&mut self, after: AfterProgression, ctx: &mut BattleContext) -> BattleResult<()> {
        if after == AfterProgression::EndWon {
            return self.resume(Resume::End(EncounterOutcome::Won), ctx);
        }

        let EncounterKind::Trainer(party) = &mut self.kind else {
            return self.resume(Resume::End(EncounterOutcome::Won), ctx);
        };
        if party.reserves.is_empty() {
            return self.resume(Resume::End(EncounterOutcome::Won), ctx);
        }

        let next = party.reserves.remove(0);
        let trainer = party.name.clone();
        let agent = next.nickname.clone();
        ctx.roster.record_sighting(&next.species, false);
        info!(%trainer, %agent, remaining = party.reserves.len(), "trainer sent out next agent");
        self.enemy = next;
        self.narrate(
            Phase::SendOut,
            [BattleEvent::TrainerSentOut { trainer, agent }],
            Resume::AfterSendOut,
            ctx,
        )
    }

    fn store_captured(&mut self, ctx: &mut BattleContext) -> BattleResult<()> {
        let mut caught = self.enemy.clone();
        caught.is_wild = false;
        caught.status = None;
        caught.reset_battle_state();
        ctx.roster.record_sighting(&caught.species, true);

        let agent = caught.nickname.clone();
        match ctx.roster.receive_captured(caught) {
            CaptureDestination::Party => self.narrate(
                Phase::Catch,
                [BattleEvent::AddedToTeam { agent }],
                Resume::AwardCaptureXp,
                ctx,
            ),
            CaptureDestination::Storage => self.narrate(
                Phase::Catch,
                [BattleEvent::SentToStorage { agent }],
                Resume::End(EncounterOutcome::Won),
                ctx,
            ),
        }
    }
}
