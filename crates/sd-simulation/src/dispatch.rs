//! Activation entry points.
//!
//! Every `do_*` function resolves its target sectors from a tag (or the
//! activating line's back sector for tag 0), skips sectors whose planes are
//! already owned, and starts one mover per remaining sector. They return
//! `true` if anything was started or changed.

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sd_core::{LineId, Plane, SectorId, SectorSpecial};

use crate::crush::{CrushMode, CrushPolicy};
use crate::error::{SimError, SimResult};
use crate::event::SimEventKind;
use crate::level::Level;
use crate::mover::animated_door::{AnimatedDoor, AnimatedDoorState, SlidingDoorRequest};
use crate::mover::ceiling::{Ceiling, CeilingRequest};
use crate::mover::change::Transfer;
use crate::mover::door::{Door, DoorKind, DoorRequest};
use crate::mover::elevator::{Elevator, ElevatorRequest};
use crate::mover::floor::{
    DonutRequest, Floor, FloorKind, FloorRequest, STAIR_CRUSH_DAMAGE, StairDirection, StairRequest,
    StairTiming,
};
use crate::mover::pillar::{Pillar, PillarRequest};
use crate::mover::plat::{Plat, PlatKind, PlatRequest, TOGGLE_CRUSH_DAMAGE};
use crate::mover::waggle::{Waggle, WaggleRequest};
use crate::mover::{Behavior, Family, Mover, MoverId, Thinker};
use crate::scroller::{Affectee, ScrollKind, Scroller, ScrollerRequest};

fn accepted(what: &str, result: SimResult<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            warn!("{what} activation rejected: {err}");
            false
        }
    }
}

impl Level {
    fn targets(&self, tag: i32, line: Option<LineId>) -> Vec<SectorId> {
        self.geometry.resolve(tag, line)
    }

    fn known_line(&self, line: Option<LineId>) -> SimResult<()> {
        match line {
            Some(id) if self.geometry.line(id).is_none() => Err(SimError::LineNotFound(id)),
            _ => Ok(()),
        }
    }

    fn known_sector(&self, sector: Option<SectorId>) -> SimResult<()> {
        match sector {
            Some(id) if self.geometry.sector(id).is_none() => Err(SimError::SectorNotFound(id)),
            _ => Ok(()),
        }
    }

    fn crush_mode(&self, mode: Option<CrushMode>) -> CrushMode {
        mode.unwrap_or(self.config.crush_mode)
    }

    fn floor_height(&self, sector: SectorId) -> f64 {
        self.geometry.sector(sector).map_or(0.0, |s| s.floor_height)
    }

    fn apply_transfer(&mut self, transfer: &Transfer, sector: SectorId, plane: Plane) {
        let (_, mut ctx) = self.split();
        transfer.apply(&mut ctx, sector, plane);
    }

    /// Open, close or raise doors.
    ///
    /// A manual (tag 0) raise on a busy raise door re-triggers it: a closing
    /// door reopens, and a player may send any other one back down.
    pub fn do_door(&mut self, request: &DoorRequest) -> bool {
        if !accepted("door", request.validate().and_then(|()| self.known_line(request.line))) {
            return false;
        }

        if request.tag == 0 {
            let Some(sector) = self.targets(0, request.line).first().copied() else {
                return false;
            };
            if let Some(id) = self.owners.owner(sector, Plane::Ceiling) {
                if request.kind != DoorKind::Raise {
                    return false;
                }
                let (movers, mut ctx) = self.split();
                let Some(mover) = movers.iter_mut().find(|m| m.id() == id) else {
                    return false;
                };
                return match mover.behavior_mut() {
                    Behavior::Door(door) => door.retrigger(&mut ctx, sector, request.by_player),
                    _ => false,
                };
            }
        }

        let mut started = false;
        for sector in self.targets(request.tag, request.line) {
            if self.owners.is_busy(sector, &[Plane::Ceiling]) {
                continue;
            }
            let Some(door) = Door::new(&self.geometry, sector, request) else {
                continue;
            };
            started |= self.install(sector, Behavior::Door(door)).is_some();
        }
        started
    }

    /// Start platforms.
    ///
    /// Toggle and perpetual platforms first wake any of their kind paused
    /// under the same tag.
    pub fn do_plat(&mut self, request: &PlatRequest) -> bool {
        if !accepted("plat", request.validate().and_then(|()| self.known_line(request.line))) {
            return false;
        }

        let mut started = false;
        if request.tag != 0 && matches!(request.kind, PlatKind::Toggle | PlatKind::PerpetualRaise) {
            started |= self.activate_in_stasis(request.tag);
        }

        for sector in self.targets(request.tag, request.line) {
            if self.owners.is_busy(sector, &[Plane::Floor]) {
                continue;
            }
            let up_first = self.coin_flip(sector);
            let crush = CrushPolicy::new(TOGGLE_CRUSH_DAMAGE, self.config.crush_mode);
            let Some(plat) = Plat::new(&self.geometry, sector, request, up_first, crush) else {
                continue;
            };
            if request.change {
                let floor = self.floor_height(sector);
                if let Some(transfer) =
                    Transfer::from_code(&self.geometry, sector, Plane::Floor, 1, request.line, floor)
                {
                    self.apply_transfer(&transfer, sector, Plane::Floor);
                }
            }
            started |= self.install(sector, Behavior::Plat(plat)).is_some();
        }
        started
    }

    /// Deterministic per-activation coin flip for perpetual platforms.
    fn coin_flip(&self, sector: SectorId) -> bool {
        let sector = u64::try_from(sector.0).unwrap_or(u64::MAX);
        let seed = self.config.seed ^ (self.clock.tic() << 20) ^ sector;
        StdRng::seed_from_u64(seed).random_bool(0.5)
    }

    /// Pause (`remove == false`) or destroy the platforms under `tag`.
    pub fn stop_plat(&mut self, tag: i32, remove: bool) -> bool {
        let ids = self.tagged(tag, |m| m.family() == Family::Plat && !m.in_stasis());
        self.stop_or_remove(&ids, remove)
    }

    /// Wake every paused platform under `tag`.
    pub fn activate_in_stasis(&mut self, tag: i32) -> bool {
        let ids = self.tagged(tag, |m| m.family() == Family::Plat && m.in_stasis());
        self.reactivate(&ids)
    }

    /// Start ceiling movers and crushers.
    ///
    /// Crushers first wake any crusher paused under the same tag.
    pub fn do_ceiling(&mut self, request: &CeilingRequest) -> bool {
        if !accepted("ceiling", request.validate().and_then(|()| self.known_line(request.line))) {
            return false;
        }

        let mut started = false;
        if request.tag != 0 && request.kind.is_crusher() {
            started |= self.activate_in_stasis_ceiling(request.tag);
        }

        let crush = CrushPolicy::from_option(request.crush, self.crush_mode(request.crush_mode));
        for sector in self.targets(request.tag, request.line) {
            if self.owners.is_busy(sector, &[Plane::Ceiling]) {
                continue;
            }
            let Some(ceiling) = Ceiling::new(&self.geometry, sector, request, crush) else {
                continue;
            };
            started |= self.install(sector, Behavior::Ceiling(ceiling)).is_some();
        }
        started
    }

    /// Pause (`remove == false`) or destroy the moving ceilings under `tag`.
    pub fn ceiling_crush_stop(&mut self, tag: i32, remove: bool) -> bool {
        let ids = self.tagged(tag, |m| m.family() == Family::Ceiling && !m.in_stasis());
        self.stop_or_remove(&ids, remove)
    }

    /// Wake every paused ceiling under `tag`.
    pub fn activate_in_stasis_ceiling(&mut self, tag: i32) -> bool {
        let ids = self.tagged(tag, |m| m.family() == Family::Ceiling && m.in_stasis());
        self.reactivate(&ids)
    }

    /// Destroy every ceiling mover in the sectors tagged `tag`.
    pub fn stop_ceiling(&mut self, tag: i32) -> bool {
        self.remove_on_plane(tag, Plane::Ceiling, |m| m.family() == Family::Ceiling)
    }

    /// Ids of paused movers under `tag`, in tick order.
    pub fn in_stasis(&self, tag: i32) -> Vec<MoverId> {
        self.tagged(tag, Mover::in_stasis)
    }

    /// Start floor movers.
    pub fn do_floor(&mut self, request: &FloorRequest) -> bool {
        if !accepted("floor", request.validate().and_then(|()| self.known_line(request.line))) {
            return false;
        }
        if request.kind.is_internal() {
            warn!("floor activation rejected: {:?} is not an activation kind", request.kind);
            return false;
        }

        let crush = CrushPolicy::from_option(request.crush, self.crush_mode(request.crush_mode));
        let mut started = false;
        for sector in self.targets(request.tag, request.line) {
            if self.owners.is_busy(sector, &[Plane::Floor]) {
                continue;
            }
            let Some(floor) = Floor::new(&self.geometry, sector, request, crush) else {
                continue;
            };
            if request.kind == FloorKind::RaiseAndChange {
                let model = request.line.and_then(|l| self.geometry.line(l)).map(|l| l.front);
                if let Some(transfer) = model.and_then(|m| Transfer::copy_of(&self.geometry, m, Plane::Floor)) {
                    self.apply_transfer(&transfer, sector, Plane::Floor);
                }
            }
            started |= self.install(sector, Behavior::Floor(floor)).is_some();
        }
        started
    }

    /// Destroy every floor mover in the sectors tagged `tag`.
    pub fn stop_floor(&mut self, tag: i32) -> bool {
        self.remove_on_plane(tag, Plane::Floor, |m| m.family() == Family::Floor)
    }

    /// Destroy the crushing floors in the sectors tagged `tag`.
    pub fn floor_crush_stop(&mut self, tag: i32) -> bool {
        self.remove_on_plane(tag, Plane::Floor, |m| {
            m.behavior().as_floor().is_some_and(|f| f.kind().is_crusher())
        })
    }

    /// Build stairs starting at each sector under the request's tag.
    ///
    /// The chain follows two-sided lines whose front is the current step into
    /// a back sector with the same floor texture, or, with `use_specials`,
    /// into a neighbour carrying the alternate stair special.
    pub fn build_stairs(&mut self, request: &StairRequest) -> bool {
        if !accepted("stair", request.validate().and_then(|()| self.known_line(request.line))) {
            return false;
        }

        let step = match request.direction {
            StairDirection::Up => request.step_size,
            StairDirection::Down => -request.step_size,
        };
        let timing = StairTiming {
            delay: request.delay,
            per_step_time: (request.step_size / request.speed) as i32,
            reset: request.reset,
        };
        let crush = if request.crush {
            CrushPolicy::new(STAIR_CRUSH_DAMAGE, self.config.crush_mode)
        } else {
            CrushPolicy::none()
        };

        let mut started = false;
        for first in self.targets(request.tag, request.line) {
            if self.owners.is_busy(first, &[Plane::Floor]) {
                continue;
            }
            let mut height = self.floor_height(first) + step;
            if !self.start_step(first, height, request, timing, crush) {
                continue;
            }
            started = true;

            let mut sector = first;
            while let Some(next) = self.next_step(sector, first, request, step, &mut height) {
                if !self.start_step(next, height, request, timing, crush) {
                    break;
                }
                sector = next;
            }
        }
        started
    }

    fn start_step(
        &mut self,
        sector: SectorId,
        dest: f64,
        request: &StairRequest,
        timing: StairTiming,
        crush: CrushPolicy,
    ) -> bool {
        let org = self.floor_height(sector);
        let speed = if request.sync {
            request.speed * (dest - org).abs() / request.step_size
        } else {
            request.speed
        };
        if speed <= 0.0 {
            return false;
        }
        let step = Floor::stair(org, dest, speed, timing, crush);
        self.install(sector, Behavior::Floor(step)).is_some()
    }

    /// Find the step after `sector`, advancing `height` the way the chain
    /// does.
    fn next_step(
        &self,
        sector: SectorId,
        first: SectorId,
        request: &StairRequest,
        step: f64,
        height: &mut f64,
    ) -> Option<SectorId> {
        let current = self.geometry.sector(sector)?;
        let texture = self.geometry.sector(first)?.floor_texture.clone();
        let wanted_special = if current.special.special == SectorSpecial::STAIRS_SPECIAL1 {
            SectorSpecial::STAIRS_SPECIAL2
        } else {
            SectorSpecial::STAIRS_SPECIAL1
        };
        let stair_index = self.config.compat.stair_index;

        for &line_id in self.geometry.lines_of(sector) {
            let Some(line) = self.geometry.line(line_id) else {
                continue;
            };
            let candidate = if request.use_specials {
                line.other_sector(sector)
            } else if line.front == sector {
                line.back
            } else {
                None
            };
            let Some(candidate) = candidate else {
                continue;
            };
            let Some(next) = self.geometry.sector(candidate) else {
                continue;
            };
            if request.use_specials {
                if next.special.special != wanted_special {
                    continue;
                }
            } else if !request.ignore_texture && next.floor_texture != texture {
                continue;
            }

            // Doom raised the height before rejecting busy sectors.
            if stair_index {
                *height += step;
            }
            if self.owners.is_busy(candidate, &[Plane::Floor]) {
                continue;
            }
            if !stair_index {
                *height += step;
            }
            return Some(candidate);
        }
        None
    }

    /// Lower each pillar under the tag while its surrounding ring rises to
    /// the floor outside the ring, taking that sector's floor texture.
    pub fn do_donut(&mut self, request: &DonutRequest) -> bool {
        if !accepted("donut", request.validate().and_then(|()| self.known_line(request.line))) {
            return false;
        }

        let mut started = false;
        for pillar in self.targets(request.tag, request.line) {
            if self.owners.is_busy(pillar, &[Plane::Floor]) {
                continue;
            }
            let ring = self
                .geometry
                .lines_of(pillar)
                .first()
                .and_then(|&l| self.geometry.line(l))
                .and_then(|l| l.other_sector(pillar));
            let Some(ring) = ring else {
                continue;
            };
            if self.owners.is_busy(ring, &[Plane::Floor]) {
                continue;
            }
            let outside = self
                .geometry
                .lines_of(ring)
                .iter()
                .filter_map(|&l| self.geometry.line(l))
                .filter_map(|l| l.other_sector(ring))
                .find(|&s| s != pillar);
            let Some(outside) = outside.and_then(|s| self.geometry.sector(s)) else {
                continue;
            };
            let dest = outside.floor_height;
            let texture = outside.floor_texture.clone();

            let ring_floor = Floor::donut_ring(self.floor_height(ring), dest, request.slime_speed, texture);
            let pillar_floor = Floor::donut_pillar(self.floor_height(pillar), dest, request.pillar_speed);
            started |= self.install(ring, Behavior::Floor(ring_floor)).is_some();
            started |= self.install(pillar, Behavior::Floor(pillar_floor)).is_some();
        }
        started
    }

    /// Start elevators; each owns both planes of its sector.
    pub fn do_elevator(&mut self, request: &ElevatorRequest) -> bool {
        if !accepted("elevator", request.validate().and_then(|()| self.known_line(request.line))) {
            return false;
        }
        let mut started = false;
        for sector in self.targets(request.tag, request.line) {
            if self.owners.is_busy(sector, &[Plane::Floor, Plane::Ceiling]) {
                continue;
            }
            let Some(elevator) = Elevator::new(&self.geometry, sector, request) else {
                continue;
            };
            started |= self.install(sector, Behavior::Elevator(elevator)).is_some();
        }
        started
    }

    /// Build or open pillars; each owns both planes of its sector.
    pub fn do_pillar(&mut self, request: &PillarRequest) -> bool {
        if !accepted("pillar", request.validate().and_then(|()| self.known_line(request.line))) {
            return false;
        }
        let crush = CrushPolicy::from_option(request.crush, self.crush_mode(request.crush_mode));
        let mut started = false;
        for sector in self.targets(request.tag, request.line) {
            if self.owners.is_busy(sector, &[Plane::Floor, Plane::Ceiling]) {
                continue;
            }
            let Some(pillar) = Pillar::new(&self.geometry, sector, request, crush) else {
                continue;
            };
            started |= self.install(sector, Behavior::Pillar(pillar)).is_some();
        }
        started
    }

    /// Start a floor or ceiling waggle.
    pub fn start_waggle(&mut self, request: &WaggleRequest) -> bool {
        if !accepted("waggle", request.validate().and_then(|()| self.known_line(request.line))) {
            return false;
        }
        let mut started = false;
        for sector in self.targets(request.tag, request.line) {
            if self.owners.is_busy(sector, &[request.plane]) {
                continue;
            }
            let Some(waggle) = Waggle::new(&self.geometry, sector, request) else {
                continue;
            };
            started |= self.install(sector, Behavior::Waggle(waggle)).is_some();
        }
        started
    }

    /// Open a frame-swap door.
    ///
    /// Tagged activations look for a line of each target sector whose front
    /// middle texture names a door animation. A manual (tag 0) use of a door
    /// that is already open sends it closing.
    pub fn sliding_door(&mut self, request: &SlidingDoorRequest) -> bool {
        if !accepted("sliding door", request.validate().and_then(|()| self.known_line(request.line))) {
            return false;
        }

        if request.tag == 0 {
            let Some(line) = request.line else {
                return false;
            };
            let Some(sector) = self.targets(0, Some(line)).first().copied() else {
                return false;
            };
            if let Some(id) = self.owners.owner(sector, Plane::Ceiling) {
                let (movers, mut ctx) = self.split();
                let Some(mover) = movers.iter_mut().find(|m| m.id() == id) else {
                    return false;
                };
                return match mover.behavior_mut() {
                    Behavior::AnimatedDoor(door) if door.state() == AnimatedDoorState::Waiting => {
                        door.start_closing(&mut ctx, sector)
                    }
                    _ => false,
                };
            }
            return self.start_sliding_door(sector, line, request);
        }

        let mut started = false;
        for sector in self.targets(request.tag, None) {
            if self.owners.is_busy(sector, &[Plane::Ceiling]) {
                continue;
            }
            let line = self.geometry.lines_of(sector).iter().copied().find(|&l| {
                self.geometry
                    .line(l)
                    .is_some_and(|line| self.geometry.door_animation(&line.front_side.mid_texture).is_some())
            });
            if let Some(line) = line {
                started |= self.start_sliding_door(sector, line, request);
            }
        }
        started
    }

    fn start_sliding_door(&mut self, sector: SectorId, line: LineId, request: &SlidingDoorRequest) -> bool {
        let Some(door) = AnimatedDoor::new(&self.geometry, sector, line, request) else {
            return false;
        };
        let Some(id) = self.install(sector, Behavior::AnimatedDoor(door)) else {
            return false;
        };
        let (movers, mut ctx) = self.split();
        if let Some(Behavior::AnimatedDoor(door)) = movers.iter().find(|m| m.id() == id).map(Mover::behavior) {
            door.begin(&mut ctx, sector);
        }
        true
    }

    /// Add scrollers. Side scrollers act on one line; the others get one
    /// scroller per sector under the tag.
    pub fn create_scroller(&mut self, request: &ScrollerRequest) -> bool {
        let checked = request
            .validate()
            .and_then(|()| self.known_line(request.line))
            .and_then(|()| self.known_sector(request.control));
        if !accepted("scroller", checked) {
            return false;
        }

        let affectees: Vec<Affectee> = match (request.kind, request.line) {
            (ScrollKind::Side, Some(line)) => {
                let exists = self.geometry.line(line).is_some_and(|l| l.side(request.back).is_some());
                if exists {
                    vec![Affectee::Side { line, back: request.back }]
                } else {
                    Vec::new()
                }
            }
            (ScrollKind::Side, None) => Vec::new(),
            _ => self
                .targets(request.tag, request.line)
                .into_iter()
                .map(|sector| Affectee::Sector { sector })
                .collect(),
        };

        for affectee in &affectees {
            debug!("{:?} scroller added on {:?}", request.kind, affectee);
            let scroller = Scroller::new(&self.geometry, request, *affectee);
            self.scrollers.push(scroller);
        }
        !affectees.is_empty()
    }

    /// Returns `true` if any mover was removed or entered stasis.
    fn stop_or_remove(&mut self, ids: &[MoverId], remove: bool) -> bool {
        let mut changed = false;
        for &id in ids {
            let Some(mover) = self.mover_mut(id) else {
                continue;
            };
            if remove {
                self.finish(id);
                changed = true;
                continue;
            }
            if mover.behavior_mut().stop() {
                let sector = mover.sector();
                self.emit(SimEventKind::SoundStopped { sector });
                self.emit(SimEventKind::MoverStopped { mover: id });
                changed = true;
            }
        }
        changed
    }

    fn reactivate(&mut self, ids: &[MoverId]) -> bool {
        let mut woke = false;
        for &id in ids {
            let Some(mover) = self.mover_mut(id) else {
                continue;
            };
            if mover.behavior_mut().reactivate() {
                woke = true;
                self.emit(SimEventKind::MoverResumed { mover: id });
            }
        }
        woke
    }

    fn remove_on_plane(&mut self, tag: i32, plane: Plane, filter: impl Fn(&Mover) -> bool) -> bool {
        let ids: Vec<MoverId> = self
            .geometry
            .tags()
            .group(tag)
            .iter()
            .filter_map(|&sector| self.owner(sector, plane))
            .filter(|m| filter(m))
            .map(Mover::id)
            .collect();
        for &id in &ids {
            self.finish(id);
        }
        !ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use sd_core::{Actor, Geometry, Line, LineId, Sector};

    use super::*;
    use crate::config::{CompatFlags, SimConfig};
    use crate::mover::door::DoorState;
    use crate::mover::elevator::ElevatorKind;

    /// Closed door sector 1 behind line 0.
    fn door_level() -> Level {
        let geometry = Geometry::new(
            vec![Sector::new(0.0, 128.0), Sector::new(0.0, 0.0).with_tag(3)],
            vec![Line::two_sided(SectorId(0), SectorId(1))],
        )
        .unwrap();
        Level::new(geometry)
    }

    fn door_state(level: &Level) -> DoorState {
        level.movers()[0].behavior().as_door().unwrap().state()
    }

    #[test]
    fn tag_zero_without_line_does_nothing() {
        let mut level = door_level();
        assert!(!level.do_door(&DoorRequest::new(DoorKind::Raise, 0, 2.0)));
        assert!(level.movers().is_empty());
    }

    #[test]
    fn unknown_tag_does_nothing() {
        let mut level = door_level();
        assert!(!level.do_door(&DoorRequest::new(DoorKind::Raise, 77, 2.0)));
    }

    #[test]
    fn tagged_duplicate_raise_leaves_door_alone() {
        let mut level = door_level();
        let request = DoorRequest::new(DoorKind::Raise, 3, 2.0).with_delay(140);
        assert!(level.do_door(&request));
        level.run(70);
        assert_eq!(door_state(&level), DoorState::OpenWaiting);
        let countdown = level.movers()[0].behavior().as_door().unwrap().countdown();
        assert!(!level.do_door(&request));
        assert_eq!(level.movers().len(), 1);
        assert_eq!(level.movers()[0].behavior().as_door().unwrap().countdown(), countdown);
    }

    #[test]
    fn manual_raise_reverses_closing_door() {
        let mut level = door_level();
        let manual = DoorRequest::new(DoorKind::Raise, 0, 62.0).with_line(LineId(0)).with_delay(1);
        assert!(level.do_door(&manual));
        level.run(4);
        assert_eq!(door_state(&level), DoorState::Closing);
        assert!(level.do_door(&manual));
        assert_eq!(door_state(&level), DoorState::Opening);
    }

    #[test]
    fn only_players_close_open_doors() {
        let mut level = door_level();
        let manual = DoorRequest::new(DoorKind::Raise, 0, 62.0).with_line(LineId(0));
        assert!(level.do_door(&manual));
        level.run(3);
        assert_eq!(door_state(&level), DoorState::OpenWaiting);
        assert!(!level.do_door(&manual));
        assert_eq!(door_state(&level), DoorState::OpenWaiting);
        assert!(level.do_door(&manual.by_player()));
        assert_eq!(door_state(&level), DoorState::Closing);
    }

    #[test]
    fn player_sends_opening_door_back_down() {
        let mut level = door_level();
        let manual = DoorRequest::new(DoorKind::Raise, 0, 2.0).with_line(LineId(0));
        assert!(level.do_door(&manual));
        level.run(5);
        assert_eq!(door_state(&level), DoorState::Opening);
        assert!(!level.do_door(&manual));
        assert_eq!(door_state(&level), DoorState::Opening);
        assert!(level.do_door(&manual.by_player()));
        assert_eq!(door_state(&level), DoorState::Closing);
    }

    #[test]
    fn manual_raise_ignores_closing_doors_of_other_kinds() {
        for kind in [DoorKind::Close, DoorKind::CloseWaitOpen] {
            let geometry = Geometry::new(
                vec![Sector::new(0.0, 128.0), Sector::new(0.0, 64.0).with_tag(3)],
                vec![Line::two_sided(SectorId(0), SectorId(1))],
            )
            .unwrap();
            let mut level = Level::new(geometry);
            assert!(level.do_door(&DoorRequest::new(kind, 3, 2.0)));
            level.tick();
            assert_eq!(door_state(&level), DoorState::Closing);

            let manual = DoorRequest::new(DoorKind::Raise, 0, 2.0).with_line(LineId(0));
            assert!(!level.do_door(&manual));
            assert!(!level.do_door(&manual.by_player()));
            assert_eq!(door_state(&level), DoorState::Closing);
            assert_eq!(level.movers()[0].behavior().as_door().unwrap().kind(), kind);
        }
    }

    #[test]
    fn manual_open_on_busy_door_fails() {
        let mut level = door_level();
        let manual = DoorRequest::new(DoorKind::Raise, 0, 2.0).with_line(LineId(0));
        assert!(level.do_door(&manual));
        let open = DoorRequest::new(DoorKind::Open, 0, 2.0).with_line(LineId(0));
        assert!(!level.do_door(&open));
    }

    #[test]
    fn rejected_parameters_start_nothing() {
        let mut level = door_level();
        assert!(!level.do_door(&DoorRequest::new(DoorKind::Raise, 3, f64::INFINITY)));
        assert!(!level.do_floor(&FloorRequest::new(FloorKind::RaiseToHighest, 3, -2.0)));
        assert!(!level.do_door(&DoorRequest::new(DoorKind::Raise, 3, 2.0).with_line(LineId(9))));
        assert!(level.movers().is_empty());
    }

    #[test]
    fn elevator_blocks_plane_movers() {
        let geometry = Geometry::new(
            vec![Sector::new(0.0, 128.0), Sector::new(16.0, 100.0).with_tag(2)],
            vec![Line::two_sided(SectorId(0), SectorId(1))],
        )
        .unwrap();
        let mut level = Level::new(geometry);
        assert!(level.do_elevator(&ElevatorRequest::new(ElevatorKind::Down, 2, 1.0)));
        assert!(!level.do_floor(&FloorRequest::new(FloorKind::LowerToLowest, 2, 1.0)));
        assert!(!level.do_ceiling(&CeilingRequest::new(
            crate::mover::ceiling::CeilingKind::RaiseToHighest,
            2,
            1.0
        )));
    }

    #[test]
    fn floor_and_ceiling_movers_coexist() {
        let geometry = Geometry::new(
            vec![Sector::new(0.0, 128.0), Sector::new(16.0, 100.0).with_tag(2)],
            vec![Line::two_sided(SectorId(0), SectorId(1))],
        )
        .unwrap();
        let mut level = Level::new(geometry);
        assert!(level.do_floor(&FloorRequest::new(FloorKind::LowerToLowest, 2, 1.0)));
        assert!(level.do_ceiling(&CeilingRequest::new(
            crate::mover::ceiling::CeilingKind::RaiseToHighest,
            2,
            1.0
        )));
        assert_eq!(level.movers().len(), 2);
    }

    #[test]
    fn stop_floor_and_ceiling_remove_movers() {
        let geometry = Geometry::new(
            vec![Sector::new(0.0, 128.0), Sector::new(16.0, 100.0).with_tag(2)],
            vec![Line::two_sided(SectorId(0), SectorId(1))],
        )
        .unwrap();
        let mut level = Level::new(geometry);
        assert!(level.do_floor(&FloorRequest::new(FloorKind::LowerToLowest, 2, 1.0)));
        assert!(level.do_ceiling(&CeilingRequest::new(
            crate::mover::ceiling::CeilingKind::RaiseToHighest,
            2,
            1.0
        )));
        assert!(level.stop_floor(2));
        assert_eq!(level.movers().len(), 1);
        assert!(level.stop_ceiling(2));
        assert!(level.movers().is_empty());
        assert!(!level.stop_floor(2));
    }

    #[test]
    fn in_stasis_lists_paused_movers() {
        let geometry = Geometry::new(
            vec![Sector::new(-32.0, 128.0), Sector::new(0.0, 128.0).with_tag(4)],
            vec![Line::two_sided(SectorId(0), SectorId(1))],
        )
        .unwrap();
        let mut level = Level::new(geometry);
        assert!(level.do_plat(&PlatRequest::new(PlatKind::DownWaitUpStay, 4, 1.0)));
        assert!(level.in_stasis(4).is_empty());
        assert!(level.stop_plat(4, false));
        assert_eq!(level.in_stasis(4), vec![level.movers()[0].id()]);
        assert!(!level.stop_plat(4, false));
    }

    #[test]
    fn stopping_paused_or_missing_movers_reports_no_change() {
        let geometry = Geometry::new(
            vec![Sector::new(-32.0, 128.0), Sector::new(0.0, 128.0).with_tag(4)],
            vec![Line::two_sided(SectorId(0), SectorId(1))],
        )
        .unwrap();
        let mut level = Level::new(geometry);
        assert!(level.do_plat(&PlatRequest::new(PlatKind::DownWaitUpStay, 4, 1.0)));
        let id = level.movers()[0].id();
        assert!(level.stop_or_remove(&[id], false));
        let stopped = level.events().len();

        assert!(!level.stop_or_remove(&[id], false));
        assert_eq!(level.events().len(), stopped);
        assert!(level.stop_or_remove(&[id], true));
        assert!(level.movers().is_empty());
        assert!(!level.stop_or_remove(&[id], true));
    }

    #[test]
    fn perpetual_start_direction_is_seeded() {
        let geometry = Geometry::new(
            vec![
                Sector::new(-32.0, 128.0),
                Sector::new(0.0, 128.0).with_tag(4),
                Sector::new(48.0, 128.0),
            ],
            vec![
                Line::two_sided(SectorId(0), SectorId(1)),
                Line::two_sided(SectorId(2), SectorId(1)),
            ],
        )
        .unwrap();
        let start = |seed| {
            let mut level = Level::with_config(geometry.clone(), SimConfig::default().with_seed(seed));
            assert!(level.do_plat(&PlatRequest::new(PlatKind::PerpetualRaise, 4, 1.0)));
            level.movers()[0].behavior().as_plat().unwrap().status()
        };
        assert_eq!(start(7), start(7));
    }

    #[test]
    fn stair_index_compat_counts_busy_steps() {
        let geometry = || {
            Geometry::new(
                vec![
                    Sector::new(0.0, 256.0).with_tag(1).with_floor_texture("STEP"),
                    Sector::new(0.0, 256.0).with_floor_texture("STEP").with_tag(9),
                    Sector::new(0.0, 256.0).with_floor_texture("STEP"),
                ],
                vec![
                    Line::two_sided(SectorId(0), SectorId(1)),
                    Line::two_sided(SectorId(0), SectorId(2)),
                ],
            )
            .unwrap()
        };
        let dest_of_third = |config: SimConfig| {
            let mut level = Level::with_config(geometry(), config);
            assert!(level.do_floor(&FloorRequest::new(FloorKind::LowerByValue, 9, 1.0).with_height(1.0)));
            assert!(level.build_stairs(&StairRequest::new(StairDirection::Up, 1, 8.0, 1.0)));
            level
                .owner(SectorId(2), Plane::Floor)
                .and_then(|m| m.behavior().as_floor())
                .map(|f| f.dest())
        };
        assert_eq!(dest_of_third(SimConfig::default()), Some(16.0));
        let compat = CompatFlags {
            stair_index: true,
            ..CompatFlags::default()
        };
        assert_eq!(dest_of_third(SimConfig::default().with_compat(compat)), Some(24.0));
    }

    #[test]
    fn stairs_follow_alternating_specials() {
        let special = |value| SectorSpecial {
            special: value,
            ..SectorSpecial::default()
        };
        let geometry = Geometry::new(
            vec![
                Sector::new(0.0, 256.0).with_tag(1).with_special(special(SectorSpecial::STAIRS_SPECIAL1)),
                Sector::new(0.0, 256.0).with_special(special(SectorSpecial::STAIRS_SPECIAL2)),
                Sector::new(0.0, 256.0).with_special(special(SectorSpecial::STAIRS_SPECIAL1)),
                Sector::new(0.0, 256.0),
            ],
            vec![
                Line::two_sided(SectorId(1), SectorId(0)),
                Line::two_sided(SectorId(2), SectorId(1)),
                Line::two_sided(SectorId(2), SectorId(3)),
            ],
        )
        .unwrap();
        let mut level = Level::new(geometry);
        assert!(level.build_stairs(&StairRequest::new(StairDirection::Up, 1, 8.0, 8.0).with_specials()));
        let sectors: Vec<SectorId> = level.movers().iter().map(Mover::sector).collect();
        assert_eq!(sectors, vec![SectorId(0), SectorId(1), SectorId(2)]);
    }

    #[test]
    fn crushing_stairs_hurt_actors() {
        let geometry = Geometry::new(
            vec![Sector::new(0.0, 40.0).with_tag(1)],
            vec![],
        )
        .unwrap();
        let mut level = Level::new(geometry);
        level.actors_mut().unwrap().push(Actor::new(1, SectorId(0), 32.0, 100));
        let mut request = StairRequest::new(StairDirection::Up, 1, 16.0, 4.0);
        request.crush = true;
        assert!(level.build_stairs(&request));
        level.run(4);
        assert!(level.actors().unwrap()[0].health < 100);
    }
}
