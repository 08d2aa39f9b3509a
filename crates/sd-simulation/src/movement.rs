use sd_core::{Plane, SectorId};

use crate::context::TickContext;
use crate::crush::CrushPolicy;
use crate::event::SimEventKind;

/// Result of moving one plane by one tic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// Moved without reaching the destination.
    Ok,
    /// Blocked by an actor.
    Crushed,
    /// Reached (and snapped to) the destination.
    PastDest,
}

/// Move a floor one step toward `dest`.
pub fn move_floor(
    ctx: &mut TickContext<'_>,
    sector: SectorId,
    speed: f64,
    dest: f64,
    up: bool,
    crush: &mut CrushPolicy,
) -> MoveResult {
    move_plane(ctx, sector, Plane::Floor, speed, dest, up, crush)
}

/// Move a ceiling one step toward `dest`.
pub fn move_ceiling(
    ctx: &mut TickContext<'_>,
    sector: SectorId,
    speed: f64,
    dest: f64,
    up: bool,
    crush: &mut CrushPolicy,
) -> MoveResult {
    move_plane(ctx, sector, Plane::Ceiling, speed, dest, up, crush)
}

/// Move `plane` of `sector` by `speed` toward `dest`.
///
/// Only a plane closing the gap (floor up, ceiling down) can be blocked. When
/// blocked, the move is reverted unless the policy presses on; overshooting
/// moves that end blocked are always reverted.
pub fn move_plane(
    ctx: &mut TickContext<'_>,
    sector: SectorId,
    plane: Plane,
    speed: f64,
    dest: f64,
    up: bool,
    crush: &mut CrushPolicy,
) -> MoveResult {
    let Some(current) = ctx.geometry.sector(sector) else {
        return MoveResult::PastDest;
    };
    let old = current.height(plane);
    let closing = matches!((plane, up), (Plane::Floor, true) | (Plane::Ceiling, false));

    let mut dest = dest;
    if closing && !ctx.config.compat.floor_move {
        dest = match plane {
            Plane::Floor => dest.min(current.ceiling_height),
            Plane::Ceiling => dest.max(current.floor_height),
        };
    }

    let step = if up { old + speed } else { old - speed };
    let arrived = if up { step >= dest } else { step <= dest };
    let new = if arrived { dest } else { step };
    set_height(ctx, sector, plane, new);

    if !closing {
        return if arrived {
            MoveResult::PastDest
        } else {
            MoveResult::Ok
        };
    }

    let mut record = ctx
        .collision
        .check_fit(ctx.geometry, sector, crush.damage_now());
    record.at_limit = arrived;
    crush.observe(&record);
    if record.damaged > 0 {
        ctx.emit(SimEventKind::ActorsCrushed {
            sector,
            count: record.damaged,
        });
    }

    if !record.blocked {
        return if arrived {
            MoveResult::PastDest
        } else {
            MoveResult::Ok
        };
    }
    if arrived || !crush.presses() {
        set_height(ctx, sector, plane, old);
    }
    MoveResult::Crushed
}

fn set_height(ctx: &mut TickContext<'_>, sector: SectorId, plane: Plane, height: f64) {
    if let Some(s) = ctx.geometry.sector_mut(sector) {
        s.set_height(plane, height);
    }
}
