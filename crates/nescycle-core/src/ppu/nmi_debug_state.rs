/// PPU timing/NMI snapshot for debuggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NmiDebugState {
    /// PPUCTRL bit 7.
    pub nmi_output: bool,
    /// VBlank flag as the CPU would read it.
    pub vblank: bool,
    pub nmi_pending: bool,
    pub scanline: u16,
    pub dot: u16,
    pub frame: u64,
}
