/// What the three channels should show right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelLevels {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
}

const OFF: ChannelLevels = ChannelLevels {
    red: false,
    green: false,
    blue: false,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LampMode {
    GreenSolid,
    YellowSolid,
    RedSolid,
    RedFlash,
}

impl LampMode {
    /// Level 2 is solid red; only level 3 flashes.
    pub fn for_level(level: u8) -> LampMode {
        match level {
            0 => LampMode::GreenSolid,
            1 => LampMode::YellowSolid,
            2 => LampMode::RedSolid,
            _ => LampMode::RedFlash,
        }
    }

    fn lit(&self) -> ChannelLevels {
        match self {
            LampMode::GreenSolid => ChannelLevels {
                red: false,
                green: true,
                blue: false,
            },
            LampMode::YellowSolid => ChannelLevels {
                red: true,
                green: true,
                blue: false,
            },
            LampMode::RedSolid | LampMode::RedFlash => ChannelLevels {
                red: true,
                green: false,
                blue: false,
            },
        }
    }
}

/// Non-blocking visual status machine. Mode changes apply immediately; the
/// flash phase advances only through elapsed-time checks on `tick`, so the
/// indicator stays responsive regardless of the measurement cadence.
pub struct StatusLamp {
    mode: LampMode,
    flash_period_ms: u32,
    lit: bool,
    last_toggle_ms: u64,
}

impl StatusLamp {
    pub fn new(flash_period_ms: u32) -> Self {
        Self {
            mode: LampMode::GreenSolid,
            flash_period_ms,
            lit: true,
            last_toggle_ms: 0,
        }
    }

    pub fn mode(&self) -> LampMode {
        self.mode
    }

    /// Selects the mode for a health level. Sets channels immediately and
    /// resets the flash phase, even when the mode is unchanged by a re-entry
    /// at the same level.
    pub fn set_level(&mut self, level: u8, now_ms: u64) -> ChannelLevels {
        self.mode = LampMode::for_level(level);
        self.lit = true;
        self.last_toggle_ms = now_ms;
        self.output()
    }

    /// High-frequency pass. Returns the new channel levels only when the
    /// output must change; a no-op in every solid mode.
    pub fn tick(&mut self, now_ms: u64) -> Option<ChannelLevels> {
        if self.mode != LampMode::RedFlash {
            return None;
        }
        if now_ms.saturating_sub(self.last_toggle_ms) < self.flash_period_ms as u64 {
            return None;
        }
        self.lit = !self.lit;
        self.last_toggle_ms = now_ms;
        Some(self.output())
    }

    fn output(&self) -> ChannelLevels {
        if self.lit {
            self.mode.lit()
        } else {
            OFF
        }
    }
}
