//! Job gauge shapes.
//!
//! Hosts expose a different gauge per job. Rather than a generic "read gauge
//! of type T" accessor, the observer returns one variant of a closed [`Gauge`]
//! enum and conditions test it through [`GaugeCheck`].

/// Gauge state for the local player's current job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Gauge {
    #[default]
    None,
    WhiteMage(WhiteMageGauge),
    Sage(SageGauge),
}

impl Gauge {
    /// Evaluates `check` against this gauge. Checks for another job's gauge are false.
    pub fn satisfies(&self, check: GaugeCheck) -> bool {
        match (self, check) {
            (Self::WhiteMage(g), GaugeCheck::LiliesAtLeast(n)) => g.lilies >= n,
            (Self::WhiteMage(g), GaugeCheck::BloodLilyBloomed) => g.blood_lily_bloomed(),
            (Self::WhiteMage(g), GaugeCheck::LilyOvercapWithin(ms)) => g.overcap_within_ms(ms),
            (Self::Sage(g), GaugeCheck::AddersgallAtLeast(n)) => g.addersgall >= n,
            (Self::Sage(g), GaugeCheck::AddersgallOvercapWithin(ms)) => g.overcap_within_ms(ms),
            (Self::Sage(g), GaugeCheck::AdderstingAtLeast(n)) => g.addersting >= n,
            _ => false,
        }
    }
}

/// Inspectable gauge predicate used by [`Condition::Gauge`](crate::Condition::Gauge).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GaugeCheck {
    LiliesAtLeast(u8),
    BloodLilyBloomed,
    /// Holding two lilies with the third due within the given milliseconds.
    LilyOvercapWithin(u32),
    AddersgallAtLeast(u8),
    /// Holding three Addersgall with the generation window at least this far along.
    AddersgallOvercapWithin(u32),
    AdderstingAtLeast(u8),
}

/// White Mage lilies and blood lily.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WhiteMageGauge {
    pub lilies: u8,
    pub blood_lilies: u8,
    /// Ever-increasing elapsed timer toward the next lily, `None` when unknown.
    pub lily_timer_ms: Option<u32>,
}

impl WhiteMageGauge {
    pub const LILY_INTERVAL_MS: u32 = 20_000;
    pub const OVERCAP_SOON_MS: u32 = 10_000;

    pub const fn has_full_lilies(&self) -> bool {
        self.lilies >= 3
    }

    pub const fn blood_lily_bloomed(&self) -> bool {
        self.blood_lilies >= 3
    }

    pub const fn next_lily_remaining_ms(&self) -> Option<u32> {
        match self.lily_timer_ms {
            Some(elapsed) => Some(Self::LILY_INTERVAL_MS - elapsed % Self::LILY_INTERVAL_MS),
            None => None,
        }
    }

    pub const fn overcap_within_ms(&self, threshold_ms: u32) -> bool {
        match self.next_lily_remaining_ms() {
            Some(remaining) => self.lilies == 2 && remaining <= threshold_ms,
            None => false,
        }
    }

    pub const fn overcap_soon(&self) -> bool {
        self.overcap_within_ms(Self::OVERCAP_SOON_MS)
    }
}

/// Sage Addersgall and Addersting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SageGauge {
    pub addersgall: u8,
    pub addersting: u8,
    /// Ever-increasing elapsed timer toward the next Addersgall, `None` when unknown.
    pub addersgall_timer_ms: Option<u32>,
}

impl SageGauge {
    pub const ADDERSGALL_INTERVAL_MS: u32 = 20_000;
    pub const OVERCAP_SOON_MS: u32 = 18_000;

    pub const fn elapsed_in_window_ms(&self) -> Option<u32> {
        match self.addersgall_timer_ms {
            Some(elapsed) => Some(elapsed % Self::ADDERSGALL_INTERVAL_MS),
            None => None,
        }
    }

    pub const fn overcap_within_ms(&self, threshold_ms: u32) -> bool {
        match self.elapsed_in_window_ms() {
            Some(elapsed) => self.addersgall == 3 && elapsed >= threshold_ms,
            None => false,
        }
    }

    pub const fn overcap_soon(&self) -> bool {
        self.overcap_within_ms(Self::OVERCAP_SOON_MS)
    }
}
