use serde::{Deserialize, Serialize};

/// Target role family. Selects the guidance paragraph appended to the system prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    #[default]
    Embedded,
    HardwarePower,
    Software,
}

impl Track {
    pub fn guidance(self) -> &'static str {
        match self {
            Track::Embedded => {
                "Optimize for embedded/firmware: C/C++, RTOS/real-time, drivers, board bring-up, \
                 debugging, CAN, FPGA SoCs."
            }
            Track::HardwarePower => {
                "Optimize for engineering designer / electrical design / power distribution: \
                 CAD-style design language, schematics/PCB layout, documentation, power \
                 integrity/load analysis, field/customer communication, learn GIS/CAD quickly."
            }
            Track::Software => {
                "Optimize for software: APIs, backend, testing, CI, reliability, metrics. ATS-friendly."
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Track::Embedded => "embedded",
            Track::HardwarePower => "hardware_power",
            Track::Software => "software",
        }
    }
}
