#[cfg(test)]
mod tests {
    use glam::DVec2;
    use skirmish_core::enums::{Personality, PilotPhase};
    use skirmish_core::types::{ShipId, SystemId};

    use crate::fsm::{evaluate, Contact, PilotAction, PilotContext};
    use crate::profiles::get_profile;

    fn make_context(personality: Personality, phase: PilotPhase) -> PilotContext {
        PilotContext {
            personality,
            phase,
            disabled: false,
            position: DVec2::ZERO,
            velocity: DVec2::ZERO,
            facing: 0.0,
            turn_rate: 0.05,
            hull_fraction: 1.0,
            weapon_range: 500.0,
            enemy: None,
            disabled_contact: None,
            exit: None,
            jumping: false,
            ticks_in_phase: 0,
        }
    }

    fn contact(id: u64, position: DVec2, hostile: bool, disabled: bool) -> Contact {
        Contact {
            id: ShipId(id),
            position,
            velocity: DVec2::ZERO,
            disabled,
            hostile,
        }
    }

    // ---- Phase transitions ----

    #[test]
    fn test_idle_stays_idle_without_contacts() {
        let ctx = make_context(Personality::Standard, PilotPhase::Idle);
        let update = evaluate(&ctx);
        assert!(!update.phase_changed);
        assert_eq!(update.new_phase, PilotPhase::Idle);
        assert!(update.target.is_none());
    }

    #[test]
    fn test_idle_to_engage_on_enemy() {
        let mut ctx = make_context(Personality::Standard, PilotPhase::Idle);
        ctx.enemy = Some(contact(7, DVec2::new(0.0, 300.0), true, false));
        let update = evaluate(&ctx);
        assert!(update.phase_changed);
        assert_eq!(update.new_phase, PilotPhase::Engage);
        assert_eq!(update.target, Some(ShipId(7)));
    }

    #[test]
    fn test_unarmed_ship_does_not_engage() {
        let mut ctx = make_context(Personality::Standard, PilotPhase::Idle);
        ctx.weapon_range = 0.0;
        ctx.enemy = Some(contact(7, DVec2::new(0.0, 300.0), true, false));
        let update = evaluate(&ctx);
        assert_eq!(update.new_phase, PilotPhase::Idle);
    }

    #[test]
    fn test_engage_fires_when_aligned_and_in_range() {
        let mut ctx = make_context(Personality::Standard, PilotPhase::Engage);
        ctx.enemy = Some(contact(1, DVec2::new(0.0, 200.0), true, false));
        let update = evaluate(&ctx);
        assert!(update.command.fire);
        assert_eq!(update.command.aim, Some(DVec2::new(0.0, 200.0)));
        // Inside standoff distance: no thrust.
        assert_eq!(update.command.thrust, 0.0);
    }

    #[test]
    fn test_engage_holds_fire_when_off_axis() {
        let mut ctx = make_context(Personality::Standard, PilotPhase::Engage);
        ctx.enemy = Some(contact(1, DVec2::new(200.0, 0.0), true, false));
        let update = evaluate(&ctx);
        assert!(!update.command.fire);
        // Enemy to the right (clockwise): turn positive, saturated.
        assert_eq!(update.command.turn, 1.0);
    }

    #[test]
    fn test_engage_closes_distance_when_far() {
        let mut ctx = make_context(Personality::Standard, PilotPhase::Engage);
        ctx.enemy = Some(contact(1, DVec2::new(0.0, 450.0), true, false));
        let update = evaluate(&ctx);
        assert_eq!(update.command.thrust, 1.0);
    }

    #[test]
    fn test_engage_to_idle_when_enemy_gone() {
        let ctx = make_context(Personality::Standard, PilotPhase::Engage);
        let update = evaluate(&ctx);
        assert_eq!(update.new_phase, PilotPhase::Idle);
        assert!(update.phase_changed);
    }

    #[test]
    fn test_low_hull_retreats_and_jumps_when_exit_known() {
        let mut ctx = make_context(Personality::Standard, PilotPhase::Engage);
        ctx.hull_fraction = 0.1;
        ctx.enemy = Some(contact(1, DVec2::new(0.0, 200.0), true, false));
        let update = evaluate(&ctx);
        assert_eq!(update.new_phase, PilotPhase::Retreat);
        assert_eq!(update.command.thrust, 1.0);

        ctx.exit = Some(SystemId(4));
        let update = evaluate(&ctx);
        assert_eq!(update.new_phase, PilotPhase::Jump);
        assert_eq!(update.command.jump, Some(SystemId(4)));
    }

    #[test]
    fn test_heroic_never_retreats() {
        let mut ctx = make_context(Personality::Heroic, PilotPhase::Engage);
        ctx.hull_fraction = 0.01;
        ctx.enemy = Some(contact(1, DVec2::new(0.0, 200.0), true, false));
        let update = evaluate(&ctx);
        assert_eq!(update.new_phase, PilotPhase::Engage);
    }

    #[test]
    fn test_disabled_overrides_everything() {
        let mut ctx = make_context(Personality::Standard, PilotPhase::Engage);
        ctx.disabled = true;
        ctx.enemy = Some(contact(1, DVec2::new(0.0, 200.0), true, false));
        let update = evaluate(&ctx);
        assert_eq!(update.new_phase, PilotPhase::Disabled);
        assert!(!update.command.fire);
        assert_eq!(update.command.thrust, 0.0);

        ctx.disabled = false;
        ctx.phase = PilotPhase::Disabled;
        assert_eq!(evaluate(&ctx).new_phase, PilotPhase::Idle);
    }

    // ---- Boarding ----

    #[test]
    fn test_plunderer_boards_disabled_hostile() {
        let mut ctx = make_context(Personality::Plunderer, PilotPhase::Idle);
        ctx.disabled_contact = Some(contact(9, DVec2::new(0.0, 30.0), true, true));
        let update = evaluate(&ctx);
        assert_eq!(update.new_phase, PilotPhase::Board);

        ctx.phase = PilotPhase::Board;
        let update = evaluate(&ctx);
        assert_eq!(update.action, Some(PilotAction::Board(ShipId(9))));
        assert_eq!(update.new_phase, PilotPhase::Idle);
    }

    #[test]
    fn test_standard_assists_disabled_ally() {
        let mut ctx = make_context(Personality::Standard, PilotPhase::Board);
        ctx.disabled_contact = Some(contact(3, DVec2::new(20.0, 0.0), false, true));
        let update = evaluate(&ctx);
        assert_eq!(update.action, Some(PilotAction::Assist(ShipId(3))));
    }

    #[test]
    fn test_standard_ignores_disabled_hostile() {
        let mut ctx = make_context(Personality::Standard, PilotPhase::Idle);
        ctx.disabled_contact = Some(contact(9, DVec2::new(0.0, 30.0), true, true));
        let update = evaluate(&ctx);
        assert_eq!(update.new_phase, PilotPhase::Idle);
        assert!(update.action.is_none());
    }

    #[test]
    fn test_board_approaches_when_far() {
        let mut ctx = make_context(Personality::Plunderer, PilotPhase::Board);
        ctx.disabled_contact = Some(contact(9, DVec2::new(0.0, 1000.0), true, true));
        let update = evaluate(&ctx);
        assert!(update.action.is_none());
        assert_eq!(update.new_phase, PilotPhase::Board);
        assert_eq!(update.command.thrust, 1.0);
    }

    // ---- Departure ----

    #[test]
    fn test_idle_departure_after_limit() {
        let mut ctx = make_context(Personality::Timid, PilotPhase::Idle);
        ctx.exit = Some(SystemId(2));
        ctx.ticks_in_phase = get_profile(Personality::Timid).idle_departure.unwrap();
        let update = evaluate(&ctx);
        assert_eq!(update.new_phase, PilotPhase::Jump);
        assert_eq!(update.command.jump, Some(SystemId(2)));

        ctx.phase = PilotPhase::Jump;
        ctx.jumping = true;
        let update = evaluate(&ctx);
        assert_eq!(update.command.jump, None);
    }

    #[test]
    fn test_guard_never_departs() {
        let mut ctx = make_context(Personality::Guard, PilotPhase::Idle);
        ctx.exit = Some(SystemId(2));
        ctx.ticks_in_phase = u32::MAX;
        assert_eq!(evaluate(&ctx).new_phase, PilotPhase::Idle);
    }

    #[test]
    fn test_idle_brakes_when_drifting() {
        let mut ctx = make_context(Personality::Standard, PilotPhase::Idle);
        ctx.velocity = DVec2::new(0.0, -5.0);
        // Facing +y while moving -y: already facing against the motion.
        let update = evaluate(&ctx);
        assert_eq!(update.command.thrust, 1.0);
    }
}
