//! The encounter state machine.
//!
//! An [`Encounter`] is plain data: phase, cursors, the opponent, the message
//! queue and at most one pending continuation. Everything it talks to
//! (content, roster, randomness, presentation) arrives through a
//! [`BattleContext`] on each call, so an encounter can be snapshotted,
//! restored and driven from tests without a real input loop.

use crate::agent::AgentInst;
use crate::battle::ai::{Behavior, MoveChoice, ScoringAI};
use crate::battle::catch::{can_attempt_catch, roll_capture, CaptureRoll, CatchError};
use crate::battle::presentation::{AnimationCue, PresentationSink, SoundCue};
use crate::battle::runner::{CombatantView, EncounterView};
use crate::battle::sequences::Resume;
use crate::battle::state::{
    ensure_no_pending, BattleEvent, BattleRng, EncounterKind, EncounterOutcome, EventBus, Input,
    MessageQueue, Phase, Side,
};
use crate::battle::turn_orchestrator::{
    resolve_exchange, resolve_free_move, BattleNames, TurnReport,
};
use crate::config::BattleConfig;
use crate::content::ContentCatalog;
use crate::errors::{ActionError, BattleResult, BattleStateError, ContentResult};
use crate::roster::RosterAccess;
use schema::{ItemKind, MoveId, SpeciesId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

pub const MENU_FIGHT: usize = 0;
pub const MENU_BAG: usize = 1;
pub const MENU_AGENTS: usize = 2;
pub const MENU_RUN: usize = 3;
const MENU_OPTIONS: usize = 4;
/// Four move slots plus "don't learn".
pub const LEARN_OPTIONS: usize = 5;
pub const LEARN_DECLINE: usize = 4;

/// Seconds a hit or capture shake stays on screen.
pub const SHAKE_DURATION: f64 = 0.3;
/// Seconds the super-effective flash stays on screen.
pub const FLASH_DURATION: f64 = 0.4;

/// The collaborators one call into the engine needs.
pub struct BattleContext<'a> {
    pub catalog: &'a ContentCatalog,
    pub roster: &'a mut dyn RosterAccess,
    pub rng: &'a mut BattleRng,
    pub sink: &'a mut dyn PresentationSink,
    pub config: BattleConfig,
}

impl<'a> BattleContext<'a> {
    pub fn new(
        catalog: &'a ContentCatalog,
        roster: &'a mut dyn RosterAccess,
        rng: &'a mut BattleRng,
        sink: &'a mut dyn PresentationSink,
    ) -> Self {
        Self {
            catalog,
            roster,
            rng,
            sink,
            config: BattleConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursors {
    pub menu: usize,
    pub moves: usize,
    pub bag: usize,
    pub switch: usize,
    pub learn: usize,
}

/// Cosmetic timers. They count down in `tick` and never gate a transition.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationTimers {
    pub shake: f64,
    pub shake_target: Option<Side>,
    pub flash: f64,
    pub flash_target: Option<Side>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct CaptureState {
    pub(super) roll: CaptureRoll,
    pub(super) beats_played: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub(super) struct LearnState {
    pub(super) move_id: MoveId,
    pub(super) after: crate::battle::sequences::AfterProgression,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Encounter {
    /// Where input goes: a selection phase, `Message`, `Catch` or a terminal phase.
    pub(super) phase: Phase,
    /// What the current narration belongs to. Equal to `phase` outside `Message`.
    pub(super) stage: Phase,
    pub(super) player_index: usize,
    pub(super) enemy: AgentInst,
    pub(super) kind: EncounterKind,
    pub(super) cursors: Cursors,
    pub(super) messages: MessageQueue,
    pub(super) pending: Option<Resume>,
    pub(super) pending_moves: VecDeque<MoveId>,
    pub(super) pending_evolution: Option<SpeciesId>,
    pub(super) learning: Option<LearnState>,
    pub(super) capture: Option<CaptureState>,
    pub(super) timers: AnimationTimers,
    pub(super) outcome: Option<EncounterOutcome>,
}

impl Encounter {
    /// Sets up an encounter against `opponent`.
    ///
    /// Every species and move the battle can touch is looked up first, so a
    /// bad identifier rejects the start instead of surfacing mid-battle.
    pub fn start(
        opponent: AgentInst,
        kind: EncounterKind,
        ctx: &mut BattleContext,
    ) -> BattleResult<Self> {
        validate_agent(&opponent, ctx.catalog)?;
        if let EncounterKind::Trainer(party) = &kind {
            for reserve in &party.reserves {
                validate_agent(reserve, ctx.catalog)?;
                if reserve.is_fainted() {
                    return Err(BattleStateError::OpponentFainted(reserve.nickname.clone()).into());
                }
            }
        }
        for member in ctx.roster.party() {
            validate_agent(member, ctx.catalog)?;
        }

        if opponent.is_fainted() {
            return Err(BattleStateError::OpponentFainted(opponent.nickname.clone()).into());
        }
        let player_index = ctx
            .roster
            .party()
            .iter()
            .position(|agent| !agent.is_fainted())
            .ok_or(BattleStateError::NoUsableAgent)?;

        ctx.roster.record_sighting(&opponent.species, false);
        info!(
            opponent = %opponent.nickname,
            level = opponent.level(),
            trainer = kind.is_trainer(),
            "encounter started"
        );

        Ok(Self {
            phase: Phase::Intro,
            stage: Phase::Intro,
            player_index,
            enemy: opponent,
            kind,
            cursors: Cursors::default(),
            messages: MessageQueue::default(),
            pending: None,
            pending_moves: VecDeque::new(),
            pending_evolution: None,
            learning: None,
            capture: None,
            timers: AnimationTimers::default(),
            outcome: None,
        })
    }

    /// Processes one input. Returns the outcome on the call that ends the encounter.
    pub fn advance(
        &mut self,
        input: Input,
        ctx: &mut BattleContext,
    ) -> BattleResult<Option<EncounterOutcome>> {
        if self.outcome.is_some() {
            warn!(?input, "input after the encounter ended");
            return Err(ActionError::EncounterFinished.into());
        }

        match self.phase {
            Phase::Intro => self.begin_intro(ctx)?,
            Phase::Message => self.handle_message(input, ctx)?,
            Phase::Menu => self.handle_menu(input, ctx)?,
            Phase::MoveSelect => self.handle_move_select(input, ctx)?,
            Phase::Bag => self.handle_bag(input, ctx)?,
            Phase::Switch => self.handle_switch(input, ctx)?,
            Phase::LearnMove => self.handle_learn_move(input, ctx)?,
            Phase::Catch => self.play_capture_beat(ctx)?,
            other => {
                return Err(BattleStateError::InconsistentState(format!(
                    "no input handler for phase {other:?}"
                ))
                .into())
            }
        }

        // Every later call fails above, so the outcome is reported exactly once.
        Ok(self.outcome)
    }

    pub fn is_active(&self) -> bool {
        self.outcome.is_none()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stage(&self) -> Phase {
        self.stage
    }

    pub fn outcome(&self) -> Option<EncounterOutcome> {
        self.outcome
    }

    pub fn enemy(&self) -> &AgentInst {
        &self.enemy
    }

    pub fn kind(&self) -> &EncounterKind {
        &self.kind
    }

    pub fn player_index(&self) -> usize {
        self.player_index
    }

    pub fn cursors(&self) -> Cursors {
        self.cursors
    }

    pub fn timers(&self) -> AnimationTimers {
        self.timers
    }

    /// The narration line waiting for Confirm, if any.
    pub fn current_message(&self) -> Option<&str> {
        if self.phase == Phase::Message {
            self.messages.current()
        } else {
            None
        }
    }

    /// Counts the cosmetic timers down by `dt` seconds.
    pub fn tick(&mut self, dt: f64) {
        self.timers.shake = (self.timers.shake - dt).max(0.0);
        self.timers.flash = (self.timers.flash - dt).max(0.0);
        if self.timers.shake == 0.0 {
            self.timers.shake_target = None;
        }
        if self.timers.flash == 0.0 {
            self.timers.flash_target = None;
        }
    }

    /// Everything a renderer needs for the current frame.
    pub fn view(&self, roster: &dyn RosterAccess) -> BattleResult<EncounterView> {
        let player = roster
            .party()
            .get(self.player_index)
            .ok_or(BattleStateError::InvalidPartyIndex(self.player_index))?;
        let (trainer, reserves_remaining) = match &self.kind {
            EncounterKind::Wild => (None, 0),
            EncounterKind::Trainer(party) => (Some(party.name.clone()), party.reserves.len()),
        };

        Ok(EncounterView {
            phase: self.phase,
            stage: self.stage,
            player: CombatantView::from_agent(player),
            enemy: CombatantView::from_agent(&self.enemy),
            cursors: self.cursors,
            message: self.current_message().map(str::to_string),
            messages_remaining: if self.phase == Phase::Message {
                self.messages.remaining()
            } else {
                0
            },
            timers: self.timers,
            trainer,
            reserves_remaining,
            learning: self.learning.as_ref().map(|learn| learn.move_id.clone()),
            capture_beats: self.capture.map(|capture| capture.beats_played),
            outcome: self.outcome,
        })
    }

    /// Serialises the whole encounter, pending continuation included.
    pub fn snapshot(&self) -> BattleResult<Vec<u8>> {
        postcard::to_allocvec(self)
            .map_err(|err| BattleStateError::Snapshot(err.to_string()).into())
    }

    pub fn restore(bytes: &[u8]) -> BattleResult<Self> {
        postcard::from_bytes(bytes).map_err(|err| BattleStateError::Snapshot(err.to_string()).into())
    }

    // --- Narration ---

    /// Puts `lines` on screen and parks `resume` until the last one is confirmed.
    /// An empty batch runs `resume` straight away.
    pub(super) fn show_messages(
        &mut self,
        stage: Phase,
        lines: Vec<String>,
        resume: Resume,
        ctx: &mut BattleContext,
    ) -> BattleResult<()> {
        ensure_no_pending(&self.pending)?;
        if lines.is_empty() {
            return self.resume(resume, ctx);
        }
        debug!(?stage, lines = lines.len(), ?resume, "narration queued");
        ctx.sink.show_messages(&lines);
        self.messages.load(lines);
        self.pending = Some(resume);
        self.phase = Phase::Message;
        self.stage = stage;
        Ok(())
    }

    pub(super) fn narrate(
        &mut self,
        stage: Phase,
        events: impl IntoIterator<Item = BattleEvent>,
        resume: Resume,
        ctx: &mut BattleContext,
    ) -> BattleResult<()> {
        let mut bus = EventBus::new();
        for event in events {
            bus.push(event);
        }
        self.show_messages(stage, bus.formatted_lines(), resume, ctx)
    }

    fn handle_message(&mut self, input: Input, ctx: &mut BattleContext) -> BattleResult<()> {
        if input != Input::Confirm {
            return Ok(());
        }
        if self.messages.advance() {
            return Ok(());
        }
        self.messages.clear();
        let resume = self.pending.take().ok_or_else(|| {
            BattleStateError::InconsistentState("narration ended without a continuation".into())
        })?;
        self.resume(resume, ctx)
    }

    /// Switches to a phase that reads input directly.
    pub(super) fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.stage = phase;
    }

    // --- Selection phases ---

    fn begin_intro(&mut self, ctx: &mut BattleContext) -> BattleResult<()> {
        let event = match &self.kind {
            EncounterKind::Wild => BattleEvent::WildAppeared {
                agent: self.enemy.nickname.clone(),
            },
            EncounterKind::Trainer(party) => BattleEvent::TrainerSentOut {
                trainer: party.name.clone(),
                agent: self.enemy.nickname.clone(),
            },
        };
        self.narrate(Phase::Intro, [event], Resume::IntroSendOut, ctx)
    }

    fn handle_menu(&mut self, input: Input, ctx: &mut BattleContext) -> BattleResult<()> {
        let cursor = self.cursors.menu;
        let moved = match input {
            Input::Up | Input::Down => Some((cursor + 2) % MENU_OPTIONS),
            Input::Left => Some(if cursor % 2 == 1 { cursor - 1 } else { cursor }),
            Input::Right => Some(if cursor % 2 == 0 { cursor + 1 } else { cursor }),
            _ => None,
        };
        if let Some(next) = moved {
            self.cursors.menu = next;
            ctx.sink.play_sound(SoundCue::Cursor);
            return Ok(());
        }
        if input != Input::Confirm {
            return Ok(());
        }

        ctx.sink.play_sound(SoundCue::Select);
        match cursor {
            MENU_FIGHT => {
                if self.active_agent(ctx.roster)?.has_usable_move() {
                    self.cursors.moves = 0;
                    self.enter(Phase::MoveSelect);
                    Ok(())
                } else {
                    ctx.sink.play_sound(SoundCue::Hit);
                    self.execute_turn(MoveChoice::Struggle, ctx)
                }
            }
            MENU_BAG => {
                if ctx.roster.bag().is_empty() {
                    self.narrate(Phase::Bag, [BattleEvent::BagEmpty], Resume::BackTo(Phase::Menu), ctx)
                } else {
                    self.cursors.bag = 0;
                    self.enter(Phase::Bag);
                    Ok(())
                }
            }
            MENU_AGENTS => {
                self.cursors.switch = 0;
                self.enter(Phase::Switch);
                Ok(())
            }
            MENU_RUN => self.attempt_run(ctx),
            other => Err(BattleStateError::InconsistentState(format!("menu cursor {other}")).into()),
        }
    }

    fn handle_move_select(&mut self, input: Input, ctx: &mut BattleContext) -> BattleResult<()> {
        let count = self.active_agent(ctx.roster)?.moves().len();
        if count == 0 {
            self.enter(Phase::Menu);
            return Ok(());
        }
        match input {
            Input::Up => {
                self.cursors.moves = (self.cursors.moves + count - 1) % count;
                ctx.sink.play_sound(SoundCue::Cursor);
            }
            Input::Down => {
                self.cursors.moves = (self.cursors.moves + 1) % count;
                ctx.sink.play_sound(SoundCue::Cursor);
            }
            Input::Cancel => self.enter(Phase::Menu),
            Input::Confirm => {
                let slot = self.cursors.moves.min(count - 1);
                if !self.active_agent(ctx.roster)?.moves()[slot].is_usable() {
                    warn!(slot, "move selected with no PP left");
                    return self.narrate(
                        Phase::MoveSelect,
                        [BattleEvent::NoPpLeft],
                        Resume::BackTo(Phase::MoveSelect),
                        ctx,
                    );
                }
                ctx.sink.play_sound(SoundCue::Select);
                ctx.sink.play_sound(SoundCue::Hit);
                return self.execute_turn(MoveChoice::Slot(slot), ctx);
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_bag(&mut self, input: Input, ctx: &mut BattleContext) -> BattleResult<()> {
        let count = ctx.roster.bag().len();
        if count == 0 {
            return self.narrate(Phase::Bag, [BattleEvent::BagEmpty], Resume::BackTo(Phase::Menu), ctx);
        }
        if self.cursors.bag >= count {
            self.cursors.bag = 0;
        }
        match input {
            Input::Up => {
                self.cursors.bag = (self.cursors.bag + count - 1) % count;
                ctx.sink.play_sound(SoundCue::Cursor);
                Ok(())
            }
            Input::Down => {
                self.cursors.bag = (self.cursors.bag + 1) % count;
                ctx.sink.play_sound(SoundCue::Cursor);
                Ok(())
            }
            Input::Cancel => {
                self.enter(Phase::Menu);
                Ok(())
            }
            Input::Confirm => {
                ctx.sink.play_sound(SoundCue::Select);
                self.use_item(ctx)
            }
            _ => Ok(()),
        }
    }

    fn use_item(&mut self, ctx: &mut BattleContext) -> BattleResult<()> {
        let catalog = ctx.catalog;
        let stack = ctx.roster.bag()[self.cursors.bag].clone();
        let item = catalog.item(&stack.item_id)?;

        match item.kind {
            ItemKind::Capture { .. } => {
                let modifier = match can_attempt_catch(
                    &self.kind,
                    &self.enemy,
                    &stack.item_id,
                    item,
                    ctx.roster.bag(),
                ) {
                    Ok(modifier) => modifier,
                    Err(CatchError::TrainerBattle) => {
                        return self.narrate(
                            Phase::Bag,
                            [BattleEvent::CantCaptureTrainerAgent],
                            Resume::BackTo(Phase::Bag),
                            ctx,
                        );
                    }
                    Err(err) => {
                        warn!(%err, "capture attempt rejected");
                        return Err(ActionError::InvalidAction(err.to_string()).into());
                    }
                };

                let catch_rate = catalog.species(&self.enemy.species)?.catch_rate;
                let roll = roll_capture(&self.enemy, catch_rate, modifier, ctx.rng);
                ctx.roster.consume_item(&stack.item_id);
                self.capture = Some(CaptureState {
                    roll,
                    beats_played: 0,
                });
                self.narrate(
                    Phase::Catch,
                    [BattleEvent::ThrewItem {
                        item_name: item.name.clone(),
                    }],
                    Resume::CaptureShakes,
                    ctx,
                )
            }
            ItemKind::Heal { amount } => {
                let restored = self.active_agent_mut(ctx.roster)?.heal(amount);
                ctx.roster.consume_item(&stack.item_id);
                debug!(item = %stack.item_id, restored, "heal item used");
                self.narrate(
                    Phase::Bag,
                    [BattleEvent::ItemUsed {
                        item_name: item.name.clone(),
                        restored,
                    }],
                    Resume::EnemyFreeMove,
                    ctx,
                )
            }
        }
    }

    fn handle_switch(&mut self, input: Input, ctx: &mut BattleContext) -> BattleResult<()> {
        let count = ctx.roster.party().len();
        if count == 0 {
            return Err(BattleStateError::NoUsableAgent.into());
        }
        match input {
            Input::Up => {
                self.cursors.switch = (self.cursors.switch + count - 1) % count;
                ctx.sink.play_sound(SoundCue::Cursor);
            }
            Input::Down => {
                self.cursors.switch = (self.cursors.switch + 1) % count;
                ctx.sink.play_sound(SoundCue::Cursor);
            }
            Input::Cancel => {
                if self.active_agent(ctx.roster)?.is_fainted() {
                    warn!("switch cannot be cancelled while the active agent is out");
                } else {
                    self.enter(Phase::Menu);
                }
            }
            Input::Confirm => return self.switch_to(self.cursors.switch, ctx),
            _ => {}
        }
        Ok(())
    }

    fn switch_to(&mut self, index: usize, ctx: &mut BattleContext) -> BattleResult<()> {
        let chosen = ctx
            .roster
            .party()
            .get(index)
            .ok_or(BattleStateError::InvalidPartyIndex(index))?;
        let name = chosen.nickname.clone();

        if chosen.is_fainted() {
            return self.narrate(
                Phase::Switch,
                [BattleEvent::NoContextLeft { agent: name }],
                Resume::BackTo(Phase::Switch),
                ctx,
            );
        }
        if index == self.player_index {
            return self.narrate(
                Phase::Switch,
                [BattleEvent::AlreadyOut { agent: name }],
                Resume::BackTo(Phase::Switch),
                ctx,
            );
        }

        ctx.sink.play_sound(SoundCue::Select);
        self.player_index = index;
        self.active_agent_mut(ctx.roster)?.reset_battle_state();
        info!(agent = %name, index, "switched in");
        self.narrate(
            Phase::Switch,
            [BattleEvent::SentOut { agent: name }],
            Resume::EnemyFreeMove,
            ctx,
        )
    }

    fn handle_learn_move(&mut self, input: Input, ctx: &mut BattleContext) -> BattleResult<()> {
        match input {
            Input::Up => {
                self.cursors.learn = (self.cursors.learn + LEARN_OPTIONS - 1) % LEARN_OPTIONS;
                ctx.sink.play_sound(SoundCue::Cursor);
                Ok(())
            }
            Input::Down => {
                self.cursors.learn = (self.cursors.learn + 1) % LEARN_OPTIONS;
                ctx.sink.play_sound(SoundCue::Cursor);
                Ok(())
            }
            Input::Confirm => {
                ctx.sink.play_sound(SoundCue::Select);
                self.settle_learn_move(Some(self.cursors.learn), ctx)
            }
            Input::Cancel => self.settle_learn_move(None, ctx),
            _ => Ok(()),
        }
    }

    fn attempt_run(&mut self, ctx: &mut BattleContext) -> BattleResult<()> {
        if self.kind.is_trainer() {
            return self.narrate(
                Phase::Run,
                [BattleEvent::CantRunFromTrainer],
                Resume::BackTo(Phase::Menu),
                ctx,
            );
        }

        // Raw speed: stat stages do not help an escape.
        let player_speed = self.active_agent(ctx.roster)?.stats().speed as f64;
        let enemy_speed = self.enemy.stats().speed.max(1) as f64;
        let chance =
            (player_speed / enemy_speed) * ctx.config.flee_speed_weight + ctx.config.flee_floor;
        let roll = ctx.rng.next_unit("escape roll");
        debug!(chance, roll, "escape attempt");

        if roll < chance {
            self.narrate(
                Phase::Run,
                [BattleEvent::GotAwaySafely],
                Resume::End(EncounterOutcome::Fled),
                ctx,
            )
        } else {
            self.narrate(Phase::Run, [BattleEvent::CantEscape], Resume::EnemyFreeMove, ctx)
        }
    }

    // --- Turn execution ---

    fn execute_turn(&mut self, player_choice: MoveChoice, ctx: &mut BattleContext) -> BattleResult<()> {
        let catalog = ctx.catalog;
        let wild = !self.kind.is_trainer();
        let player = active_in(ctx.roster, self.player_index)?;
        let enemy_choice = ScoringAI::new().choose_move(&self.enemy, player, catalog, ctx.rng)?;
        let names = BattleNames::new(player, &self.enemy, wild);
        let report = resolve_exchange(
            player,
            &mut self.enemy,
            player_choice,
            enemy_choice,
            &names,
            catalog,
            ctx.rng,
        )?;
        self.present_report(report, ctx)
    }

    /// The enemy acts once without an answer.
    pub(super) fn enemy_free_move(&mut self, ctx: &mut BattleContext) -> BattleResult<()> {
        let catalog = ctx.catalog;
        let wild = !self.kind.is_trainer();
        let player = active_in(ctx.roster, self.player_index)?;
        let enemy_choice = ScoringAI::new().choose_move(&self.enemy, player, catalog, ctx.rng)?;
        let names = BattleNames::new(player, &self.enemy, wild);
        let report =
            resolve_free_move(player, &mut self.enemy, enemy_choice, &names, catalog, ctx.rng)?;
        self.present_report(report, ctx)
    }

    fn present_report(&mut self, report: TurnReport, ctx: &mut BattleContext) -> BattleResult<()> {
        if let Some((actor, resolution)) = report.last_move {
            if resolution.hit && resolution.damage > 0 {
                let target = actor.opponent();
                self.timers.shake = SHAKE_DURATION;
                self.timers.shake_target = Some(target);
                ctx.sink.play_animation(AnimationCue::HitShake(target));
                if resolution.effectiveness > 1.0 {
                    self.timers.flash = FLASH_DURATION;
                    self.timers.flash_target = Some(target);
                    ctx.sink.play_animation(AnimationCue::SuperEffectiveFlash(target));
                }
            }
        }
        for event in report.events.events() {
            if let BattleEvent::AttackTypeEffectiveness { multiplier } = event {
                if *multiplier > 1.0 {
                    ctx.sink.play_sound(SoundCue::SuperEffective);
                } else if *multiplier < 1.0 && *multiplier > 0.0 {
                    ctx.sink.play_sound(SoundCue::NotEffective);
                }
            }
        }

        let next = match report.first_fainted() {
            Some(side) => Resume::HandleFaint(side),
            None => Resume::ToMenu,
        };
        self.show_messages(Phase::Executing, report.lines(), next, ctx)
    }

    // --- Capture ---

    fn play_capture_beat(&mut self, ctx: &mut BattleContext) -> BattleResult<()> {
        let capture = self.capture.as_mut().ok_or_else(|| {
            BattleStateError::InconsistentState("capture beat without a capture roll".into())
        })?;

        if capture.beats_played <= capture.roll.shakes {
            capture.beats_played += 1;
            self.timers.shake = SHAKE_DURATION;
            self.timers.shake_target = Some(Side::Enemy);
            ctx.sink.play_animation(AnimationCue::CaptureShake);
            return Ok(());
        }

        let roll = capture.roll;
        self.capture = None;
        let agent = self.enemy.nickname.clone();
        if roll.caught {
            ctx.sink.play_sound(SoundCue::Capture);
            info!(%agent, rate = roll.rate, "captured");
            self.narrate(
                Phase::Catch,
                [BattleEvent::Captured { agent }],
                Resume::StoreCaptured,
                ctx,
            )
        } else {
            ctx.sink.play_sound(SoundCue::CaptureFail);
            debug!(%agent, shakes = roll.shakes, "capture failed");
            self.narrate(
                Phase::Catch,
                [BattleEvent::BrokeFree { agent }],
                Resume::EnemyFreeMove,
                ctx,
            )
        }
    }

    // --- Helpers ---

    pub(super) fn active_agent<'r>(&self, roster: &'r dyn RosterAccess) -> BattleResult<&'r AgentInst> {
        roster
            .party()
            .get(self.player_index)
            .ok_or_else(|| BattleStateError::InvalidPartyIndex(self.player_index).into())
    }

    pub(super) fn active_agent_mut<'r>(
        &self,
        roster: &'r mut dyn RosterAccess,
    ) -> BattleResult<&'r mut AgentInst> {
        active_in(roster, self.player_index)
    }

    /// Ends the encounter. Stat stages never outlive a battle.
    pub(super) fn finish(&mut self, outcome: EncounterOutcome, ctx: &mut BattleContext) {
        for index in 0..ctx.roster.party().len() {
            if let Some(agent) = ctx.roster.party_member_mut(index) {
                agent.reset_battle_state();
            }
        }
        let phase = match outcome {
            EncounterOutcome::Won => Phase::Win,
            EncounterOutcome::Lost => Phase::Lose,
            EncounterOutcome::Fled => Phase::Run,
        };
        self.enter(phase);
        self.messages.clear();
        self.pending = None;
        self.outcome = Some(outcome);
        info!(?outcome, "encounter ended");
    }
}

fn active_in(roster: &mut dyn RosterAccess, index: usize) -> BattleResult<&mut AgentInst> {
    roster
        .party_member_mut(index)
        .ok_or_else(|| BattleStateError::InvalidPartyIndex(index).into())
}

fn validate_agent(agent: &AgentInst, catalog: &ContentCatalog) -> ContentResult<()> {
    catalog.species(&agent.species)?;
    for instance in agent.moves() {
        catalog.move_data(&instance.move_id)?;
    }
    Ok(())
}
