#[cfg(test)]
mod tests {
    use glam::DVec2;

    use crate::attributes::ShipAttributes;
    use crate::commands::PlayerCommand;
    use crate::components::{Body, Cargo};
    use crate::enums::*;
    use crate::error::ConfigError;
    use crate::events::SoundCue;
    use crate::resources::{Channel, ResourceLevels};
    use crate::state::{DrawItem, Frame};
    use crate::types::*;
    use crate::weapon::{DropoffCurve, MountSupport, WeaponCatalog, WeaponDef};

    // ---- Resource channels ----

    #[test]
    fn test_channel_partition() {
        assert_eq!(Channel::INSTANT.len() + Channel::DOT.len(), Channel::ALL.len());
        for c in Channel::INSTANT {
            assert!(!c.is_dot());
        }
        for c in Channel::DOT {
            assert!(c.is_dot());
        }
    }

    #[test]
    fn test_levels_get_set_every_channel() {
        let mut levels = ResourceLevels::default();
        for (i, c) in Channel::ALL.iter().enumerate() {
            levels.set(*c, i as f64 + 1.0);
        }
        for (i, c) in Channel::ALL.iter().enumerate() {
            assert_eq!(levels.get(*c), i as f64 + 1.0);
        }
        assert!(levels.has_dot());
        assert!(!levels.is_zero());
    }

    #[test]
    fn test_floor_at_zero_keeps_negative_hull() {
        let mut levels = ResourceLevels {
            hull: -5.0,
            shields: -1.0,
            corrosion: -0.5,
            ..Default::default()
        };
        levels.floor_at_zero();
        assert_eq!(levels.hull, -5.0);
        assert_eq!(levels.shields, 0.0);
        assert_eq!(levels.corrosion, 0.0);
    }

    #[test]
    fn test_levels_add_and_scale() {
        let mut a = ResourceLevels {
            hull: 10.0,
            burning: 2.0,
            ..Default::default()
        };
        let b = ResourceLevels {
            hull: 5.0,
            ..Default::default()
        } * 2.0;
        a += b;
        assert_eq!(a.hull, 20.0);
        assert_eq!(a.burning, 2.0);
    }

    #[test]
    fn test_levels_deserialize_missing_fields() {
        let levels: ResourceLevels = serde_json::from_str(r#"{"hull": 3.5}"#).unwrap();
        assert_eq!(levels.hull, 3.5);
        assert_eq!(levels.shields, 0.0);
    }

    // ---- Weapons ----

    #[test]
    fn test_dropoff_curve_shape() {
        let curve = DropoffCurve {
            start: 100.0,
            end: 200.0,
            floor: 0.5,
        };
        assert_eq!(curve.evaluate(0.0), 1.0);
        assert_eq!(curve.evaluate(100.0), 1.0);
        assert!((curve.evaluate(150.0) - 0.75).abs() < 1e-12);
        assert_eq!(curve.evaluate(200.0), 0.5);
        assert_eq!(curve.evaluate(1e9), 0.5);
    }

    #[test]
    fn test_missing_mount_type_is_error() {
        let def = WeaponDef {
            name: "Mystery Cannon".into(),
            ..Default::default()
        };
        assert!(matches!(
            def.mount_support(),
            Err(ConfigError::MissingMountType(ref n)) if n == "Mystery Cannon"
        ));

        let declared_nothing = WeaponDef {
            mounts: Some(MountSupport::default()),
            ..def
        };
        assert!(declared_nothing.mount_support().is_err());
    }

    #[test]
    fn test_mount_support_accepts() {
        let turret_only = MountSupport {
            gun: false,
            turret: true,
        };
        assert!(turret_only.accepts(MountType::Turret));
        assert!(!turret_only.accepts(MountType::Gun));
    }

    #[test]
    fn test_catalog_from_json() {
        let json = r#"[
            {"name": "Laser", "mounts": {"gun": true}, "velocity": 20, "lifetime": 30,
             "reload": 10, "damage": {"hull": 4, "shields": 6}},
            {"name": "Flak", "mounts": {"turret": true}, "anti_missile": 5, "beam_range": 200}
        ]"#;
        let catalog = WeaponCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 2);
        let laser = catalog.find("Laser").unwrap();
        assert_eq!(laser, WeaponId(0));
        let def = catalog.get(laser).unwrap();
        assert_eq!(def.damage.hull, 4.0);
        assert_eq!(def.range(), 600.0);
        assert_eq!(def.burst(), 1);
        assert_eq!(def.shot_interval(), 10.0);

        let flak = catalog.get(catalog.find("Flak").unwrap()).unwrap();
        assert!(flak.is_special());
        assert_eq!(flak.range(), 200.0);
        assert!(catalog.mount_errors().is_empty());
    }

    #[test]
    fn test_catalog_rejects_invalid_stat() {
        let def = WeaponDef {
            name: "Broken".into(),
            reload: -1.0,
            ..Default::default()
        };
        let err = WeaponCatalog::new().insert(def).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidStat { .. }));
    }

    #[test]
    fn test_catalog_bad_json() {
        assert!(matches!(
            WeaponCatalog::from_json("{not json"),
            Err(ConfigError::Json(_))
        ));
    }

    // ---- Ships ----

    #[test]
    fn test_minimum_hull_and_capacity() {
        let attrs = ShipAttributes {
            hull: 200.0,
            disabled_threshold: 0.25,
            ..Default::default()
        };
        assert_eq!(attrs.minimum_hull(), 50.0);
        assert_eq!(attrs.capacity(Channel::Hull), 200.0);
        assert_eq!(attrs.capacity(Channel::Burning), 0.0);
        let full = attrs.full_levels();
        assert_eq!(full.hull, 200.0);
        assert_eq!(full.heat, 0.0);
    }

    #[test]
    fn test_cargo_add_respects_space() {
        let mut cargo = Cargo {
            capacity: 10,
            ..Default::default()
        };
        assert_eq!(cargo.add("Ore", 7), 7);
        assert_eq!(cargo.add("Food", 7), 3);
        assert_eq!(cargo.free(), 0);
        assert_eq!(cargo.add("Ore", 1), 0);
    }

    #[test]
    fn test_body_mask_distance() {
        let body = Body::new(DVec2::ZERO, 10.0);
        assert_eq!(body.mask_distance(DVec2::new(25.0, 0.0)), 15.0);
        assert_eq!(body.mask_distance(DVec2::new(3.0, 0.0)), 0.0);
    }

    // ---- Geometry ----

    #[test]
    fn test_unit_and_angle_of_are_inverse() {
        for angle in [0.0, 0.5, -1.2, 2.9] {
            let back = angle_of(unit(angle));
            assert!(angle_delta(angle, back).abs() < 1e-12);
        }
        assert_eq!(angle_of(DVec2::ZERO), 0.0);
    }

    #[test]
    fn test_angle_delta_shortest() {
        let d = angle_delta(3.0, -3.0);
        assert!(d > 0.0 && d < 0.3);
    }

    #[test]
    fn test_wrapped_delta_crosses_seam() {
        let d = wrapped_delta(DVec2::new(10.0, 10.0), DVec2::new(4090.0, 10.0), 4096.0);
        assert!((d.x + 16.0).abs() < 1e-9);
        assert_eq!(wrap_position(DVec2::new(-1.0, 4097.0), 4096.0), DVec2::new(4095.0, 1.0));
    }

    #[test]
    fn test_sim_time_advance() {
        let mut t = SimTime::default();
        t.advance();
        t.advance();
        assert_eq!(t.tick, 2);
        assert!((t.elapsed_secs - 2.0 / 60.0).abs() < 1e-12);
    }

    // ---- Commands and frames ----

    #[test]
    fn test_player_command_serde() {
        let cmds = vec![
            PlayerCommand::Steer {
                thrust: 1.0,
                turn: -0.5,
                fire: true,
            },
            PlayerCommand::Click {
                point: DVec2::new(1.0, 2.0),
            },
            PlayerCommand::Jump {
                destination: SystemId(3),
            },
            PlayerCommand::SetTimeScale { scale: 2.0 },
            PlayerCommand::Pause,
        ];
        for cmd in cmds {
            let json = serde_json::to_string(&cmd).unwrap();
            let back: PlayerCommand = serde_json::from_str(&json).unwrap();
            assert_eq!(cmd, back);
        }
    }

    #[test]
    fn test_sound_cue_tagged() {
        let cue = SoundCue::HyperspaceEntry {
            position: DVec2::ZERO,
        };
        let json = serde_json::to_string(&cue).unwrap();
        assert!(json.contains("\"type\":\"HyperspaceEntry\""));
    }

    #[test]
    fn test_frame_clear_keeps_capacity() {
        let mut frame = Frame::with_capacity();
        frame.draw.push(DrawItem {
            kind: DrawKind::Ship,
            position: DVec2::ZERO,
            velocity: DVec2::ZERO,
            facing: 0.0,
            radius: 1.0,
        });
        let cap = frame.draw.capacity();
        frame.clear();
        assert!(frame.draw.is_empty());
        assert_eq!(frame.draw.capacity(), cap);
    }
}
