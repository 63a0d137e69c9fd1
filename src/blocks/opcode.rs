/// Behaviour tag of a block.
///
/// Adding an opcode means adding a variant here and an entry in the
/// interpreter's handler table; everything else routes to `Unknown`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    MotionGoToXY,
    MotionGoTo,
    MotionGoToMenu,
    MotionSetX,
    MotionSetY,
    MotionChangeXBy,
    MotionChangeYBy,
    MotionTurnRight,
    MotionTurnLeft,
    MotionPointInDirection,
    LooksSwitchCostumeTo,
    LooksCostume,
    LooksNextCostume,
    ControlWait,
    ControlForever,
    EventWhenFlagClicked,
    EventWhenKeyPressed,
    ProceduresCall,
    Unknown(String),
}

impl Opcode {
    pub fn from_name(name: &str) -> Self {
        match name {
            "motion_gotoxy" => Self::MotionGoToXY,
            "motion_goto" => Self::MotionGoTo,
            "motion_goto_menu" => Self::MotionGoToMenu,
            "motion_setx" => Self::MotionSetX,
            "motion_sety" => Self::MotionSetY,
            "motion_changexby" => Self::MotionChangeXBy,
            "motion_changeyby" => Self::MotionChangeYBy,
            "motion_turnright" => Self::MotionTurnRight,
            "motion_turnleft" => Self::MotionTurnLeft,
            "motion_pointindirection" => Self::MotionPointInDirection,
            "looks_switchcostumeto" => Self::LooksSwitchCostumeTo,
            "looks_costume" => Self::LooksCostume,
            "looks_nextcostume" => Self::LooksNextCostume,
            "control_wait" => Self::ControlWait,
            "control_forever" => Self::ControlForever,
            "event_whenflagclicked" => Self::EventWhenFlagClicked,
            "event_whenkeypressed" => Self::EventWhenKeyPressed,
            "procedures_call" => Self::ProceduresCall,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::MotionGoToXY => "motion_gotoxy",
            Self::MotionGoTo => "motion_goto",
            Self::MotionGoToMenu => "motion_goto_menu",
            Self::MotionSetX => "motion_setx",
            Self::MotionSetY => "motion_sety",
            Self::MotionChangeXBy => "motion_changexby",
            Self::MotionChangeYBy => "motion_changeyby",
            Self::MotionTurnRight => "motion_turnright",
            Self::MotionTurnLeft => "motion_turnleft",
            Self::MotionPointInDirection => "motion_pointindirection",
            Self::LooksSwitchCostumeTo => "looks_switchcostumeto",
            Self::LooksCostume => "looks_costume",
            Self::LooksNextCostume => "looks_nextcostume",
            Self::ControlWait => "control_wait",
            Self::ControlForever => "control_forever",
            Self::EventWhenFlagClicked => "event_whenflagclicked",
            Self::EventWhenKeyPressed => "event_whenkeypressed",
            Self::ProceduresCall => "procedures_call",
            Self::Unknown(name) => name,
        }
    }

    /// Hat blocks start scripts.
    pub fn is_hat(&self) -> bool {
        matches!(self, Self::EventWhenFlagClicked | Self::EventWhenKeyPressed)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
