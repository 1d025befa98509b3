//! Per-ship resource channels.
//!
//! `ResourceLevels` is used three ways: as a ship's live levels, as a
//! per-channel table on weapon and hull definitions (damage, protection,
//! resistance), and as the delta produced by one damage resolution.

use std::ops::{AddAssign, Mul};

use serde::{Deserialize, Serialize};

/// One named resource channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Hull,
    Shields,
    Energy,
    Heat,
    Fuel,
    Corrosion,
    Discharge,
    Ionization,
    Burning,
    Leakage,
    Disruption,
    Slowness,
    Scrambling,
}

impl Channel {
    pub const ALL: [Channel; 13] = [
        Channel::Hull,
        Channel::Shields,
        Channel::Energy,
        Channel::Heat,
        Channel::Fuel,
        Channel::Corrosion,
        Channel::Discharge,
        Channel::Ionization,
        Channel::Burning,
        Channel::Leakage,
        Channel::Disruption,
        Channel::Slowness,
        Channel::Scrambling,
    ];

    /// Channels applied in full on the tick they are dealt.
    pub const INSTANT: [Channel; 5] = [
        Channel::Hull,
        Channel::Shields,
        Channel::Energy,
        Channel::Heat,
        Channel::Fuel,
    ];

    /// Channels resolved gradually each tick.
    pub const DOT: [Channel; 8] = [
        Channel::Corrosion,
        Channel::Discharge,
        Channel::Ionization,
        Channel::Burning,
        Channel::Leakage,
        Channel::Disruption,
        Channel::Slowness,
        Channel::Scrambling,
    ];

    pub fn is_dot(self) -> bool {
        !matches!(
            self,
            Channel::Hull | Channel::Shields | Channel::Energy | Channel::Heat | Channel::Fuel
        )
    }
}

/// Thirteen numeric channels, serialized as plain fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceLevels {
    pub hull: f64,
    pub shields: f64,
    pub energy: f64,
    pub heat: f64,
    pub fuel: f64,
    pub corrosion: f64,
    pub discharge: f64,
    pub ionization: f64,
    pub burning: f64,
    pub leakage: f64,
    pub disruption: f64,
    pub slowness: f64,
    pub scrambling: f64,
}

impl ResourceLevels {
    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Hull => self.hull,
            Channel::Shields => self.shields,
            Channel::Energy => self.energy,
            Channel::Heat => self.heat,
            Channel::Fuel => self.fuel,
            Channel::Corrosion => self.corrosion,
            Channel::Discharge => self.discharge,
            Channel::Ionization => self.ionization,
            Channel::Burning => self.burning,
            Channel::Leakage => self.leakage,
            Channel::Disruption => self.disruption,
            Channel::Slowness => self.slowness,
            Channel::Scrambling => self.scrambling,
        }
    }

    pub fn get_mut(&mut self, channel: Channel) -> &mut f64 {
        match channel {
            Channel::Hull => &mut self.hull,
            Channel::Shields => &mut self.shields,
            Channel::Energy => &mut self.energy,
            Channel::Heat => &mut self.heat,
            Channel::Fuel => &mut self.fuel,
            Channel::Corrosion => &mut self.corrosion,
            Channel::Discharge => &mut self.discharge,
            Channel::Ionization => &mut self.ionization,
            Channel::Burning => &mut self.burning,
            Channel::Leakage => &mut self.leakage,
            Channel::Disruption => &mut self.disruption,
            Channel::Slowness => &mut self.slowness,
            Channel::Scrambling => &mut self.scrambling,
        }
    }

    pub fn set(&mut self, channel: Channel, value: f64) {
        *self.get_mut(channel) = value;
    }

    /// True when every channel is zero.
    pub fn is_zero(&self) -> bool {
        Channel::ALL.iter().all(|&c| self.get(c) == 0.0)
    }

    /// True when any DoT channel is active.
    pub fn has_dot(&self) -> bool {
        Channel::DOT.iter().any(|&c| self.get(c) > 0.0)
    }

    /// Clamp every channel except hull to be non-negative.
    pub fn floor_at_zero(&mut self) {
        for channel in Channel::ALL {
            if channel == Channel::Hull {
                continue;
            }
            let value = self.get_mut(channel);
            if *value < 0.0 {
                *value = 0.0;
            }
        }
    }
}

impl AddAssign for ResourceLevels {
    fn add_assign(&mut self, rhs: Self) {
        for channel in Channel::ALL {
            *self.get_mut(channel) += rhs.get(channel);
        }
    }
}

impl Mul<f64> for ResourceLevels {
    type Output = ResourceLevels;

    fn mul(mut self, rhs: f64) -> ResourceLevels {
        for channel in Channel::ALL {
            *self.get_mut(channel) *= rhs;
        }
        self
    }
}
