//! LTSSM states
//!
//! Names for the 6-bit Link Training and Status State Machine code the
//! simulator reports in answer to a link status command.

use std::fmt;

/// Bits of `read_data` that carry the LTSSM code
pub const LTSSM_MASK: u32 = 0x3F;

/// Known LTSSM states, numbered as the simulator reports them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LtssmState {
    DetectQuiet = 0x00,
    DetectActive = 0x01,
    PollingActive = 0x02,
    PollingCompliance = 0x03,
    PollingConfiguration = 0x04,
    ConfigLinkwidthStart = 0x05,
    ConfigLinkwidthAccept = 0x06,
    ConfigLanenumAccept = 0x07,
    ConfigLanenumWait = 0x08,
    ConfigComplete = 0x09,
    ConfigIdle = 0x0A,
    RecoveryRcvrLock = 0x0B,
    RecoverySpeed = 0x0C,
    RecoveryRcvrCfg = 0x0D,
    RecoveryIdle = 0x0E,
    L0 = 0x0F,
    L0s = 0x10,
    L1Entry = 0x11,
    L1Idle = 0x12,
    L2Idle = 0x13,
    L2TransmitWake = 0x14,
    Disabled = 0x15,
    Loopback = 0x16,
    HotReset = 0x17,
}

impl LtssmState {
    const ALL: [LtssmState; 24] = [
        LtssmState::DetectQuiet,
        LtssmState::DetectActive,
        LtssmState::PollingActive,
        LtssmState::PollingCompliance,
        LtssmState::PollingConfiguration,
        LtssmState::ConfigLinkwidthStart,
        LtssmState::ConfigLinkwidthAccept,
        LtssmState::ConfigLanenumAccept,
        LtssmState::ConfigLanenumWait,
        LtssmState::ConfigComplete,
        LtssmState::ConfigIdle,
        LtssmState::RecoveryRcvrLock,
        LtssmState::RecoverySpeed,
        LtssmState::RecoveryRcvrCfg,
        LtssmState::RecoveryIdle,
        LtssmState::L0,
        LtssmState::L0s,
        LtssmState::L1Entry,
        LtssmState::L1Idle,
        LtssmState::L2Idle,
        LtssmState::L2TransmitWake,
        LtssmState::Disabled,
        LtssmState::Loopback,
        LtssmState::HotReset,
    ];

    /// Look up a state by its code
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Name used in simulator logs
    pub fn name(self) -> &'static str {
        match self {
            LtssmState::DetectQuiet => "Detect.Quiet",
            LtssmState::DetectActive => "Detect.Active",
            LtssmState::PollingActive => "Polling.Active",
            LtssmState::PollingCompliance => "Polling.Compliance",
            LtssmState::PollingConfiguration => "Polling.Configuration",
            LtssmState::ConfigLinkwidthStart => "Configuration.Linkwidth.Start",
            LtssmState::ConfigLinkwidthAccept => "Configuration.Linkwidth.Accept",
            LtssmState::ConfigLanenumAccept => "Configuration.Lanenum.Accept",
            LtssmState::ConfigLanenumWait => "Configuration.Lanenum.Wait",
            LtssmState::ConfigComplete => "Configuration.Complete",
            LtssmState::ConfigIdle => "Configuration.Idle",
            LtssmState::RecoveryRcvrLock => "Recovery.RcvrLock",
            LtssmState::RecoverySpeed => "Recovery.Speed",
            LtssmState::RecoveryRcvrCfg => "Recovery.RcvrCfg",
            LtssmState::RecoveryIdle => "Recovery.Idle",
            LtssmState::L0 => "L0",
            LtssmState::L0s => "L0s",
            LtssmState::L1Entry => "L1.Entry",
            LtssmState::L1Idle => "L1.Idle",
            LtssmState::L2Idle => "L2.Idle",
            LtssmState::L2TransmitWake => "L2.TransmitWake",
            LtssmState::Disabled => "Disabled",
            LtssmState::Loopback => "LoopBack",
            LtssmState::HotReset => "Hot Reset",
        }
    }
}

/// Link status as reported by the simulator
///
/// Keeps the raw code so values outside the known table still render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkStatus {
    code: u8,
}

impl LinkStatus {
    /// Extract the LTSSM code from a response data word
    pub fn from_read_data(read_data: u32) -> Self {
        Self {
            code: (read_data & LTSSM_MASK) as u8,
        }
    }

    /// The raw 6-bit code
    pub fn code(&self) -> u8 {
        self.code
    }

    /// The decoded state, if the code is known
    pub fn state(&self) -> Option<LtssmState> {
        LtssmState::from_code(self.code)
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state() {
            Some(state) => f.write_str(state.name()),
            None => write!(f, "Unknown(0x{:02x})", self.code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_ordered_by_code() {
        for (i, state) in LtssmState::ALL.iter().enumerate() {
            assert_eq!(*state as u8 as usize, i);
        }
    }

    #[test]
    fn test_l0_and_unknown() {
        assert_eq!(LinkStatus::from_read_data(0x0F).to_string(), "L0");
        assert_eq!(LinkStatus::from_read_data(0x0F).state(), Some(LtssmState::L0));
        assert_eq!(LinkStatus::from_read_data(0x20).to_string(), "Unknown(0x20)");
    }

    #[test]
    fn test_upper_bits_are_masked() {
        let status = LinkStatus::from_read_data(0xFFFF_FF17);
        assert_eq!(status.code(), 0x17);
        assert_eq!(status.to_string(), "Hot Reset");
    }
}
