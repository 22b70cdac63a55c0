//! Screen and glyph constants of the NetHack 3.6 learning environment
//!
//! These are derived from include/display.h, include/rm.h and the
//! environment's observation shapes.

use crate::glyph::Glyph;

/// Map dimensions as seen by the agent (column 0 is dropped by the backend)
pub const ROWNO: usize = 21;
pub const COLNO: usize = 79;

/// Monster and object limits (from monst.c / objects.c)
pub const NUMMONS: Glyph = 381;
pub const NUM_OBJECTS: Glyph = 453;

/// Number of map symbols and explosion symbols (defsym.h)
pub const MAXPCHARS: Glyph = 96;
pub const MAXEXPCHARS: Glyph = 9;
pub const EXPL_MAX: Glyph = 7;
pub const NUM_ZAP: Glyph = 8;
pub const WARNCOUNT: Glyph = 6;

/// Glyph offsets (display.h)
pub const GLYPH_MON_OFF: Glyph = 0;
pub const GLYPH_PET_OFF: Glyph = NUMMONS + GLYPH_MON_OFF;
pub const GLYPH_INVIS_OFF: Glyph = NUMMONS + GLYPH_PET_OFF;
pub const GLYPH_DETECT_OFF: Glyph = 1 + GLYPH_INVIS_OFF;
pub const GLYPH_BODY_OFF: Glyph = NUMMONS + GLYPH_DETECT_OFF;
pub const GLYPH_RIDDEN_OFF: Glyph = NUMMONS + GLYPH_BODY_OFF;
pub const GLYPH_OBJ_OFF: Glyph = NUMMONS + GLYPH_RIDDEN_OFF;
pub const GLYPH_CMAP_OFF: Glyph = NUM_OBJECTS + GLYPH_OBJ_OFF;
pub const GLYPH_EXPLODE_OFF: Glyph = (MAXPCHARS - MAXEXPCHARS) + GLYPH_CMAP_OFF;
pub const GLYPH_ZAP_OFF: Glyph = (MAXEXPCHARS * EXPL_MAX) + GLYPH_EXPLODE_OFF;
pub const GLYPH_SWALLOW_OFF: Glyph = (NUM_ZAP << 2) + GLYPH_ZAP_OFF;
pub const GLYPH_WARNING_OFF: Glyph = (NUMMONS << 3) + GLYPH_SWALLOW_OFF;
pub const GLYPH_STATUE_OFF: Glyph = WARNCOUNT + GLYPH_WARNING_OFF;
pub const MAX_GLYPH: Glyph = NUMMONS + GLYPH_STATUE_OFF;

/// Map symbol indices (defsym.h)
pub const S_STONE: Glyph = 0;
pub const S_VWALL: Glyph = 1;
pub const S_HWALL: Glyph = 2;
pub const S_TLCORN: Glyph = 3;
pub const S_TRCORN: Glyph = 4;
pub const S_BLCORN: Glyph = 5;
pub const S_BRCORN: Glyph = 6;
pub const S_CRWALL: Glyph = 7;
pub const S_TUWALL: Glyph = 8;
pub const S_TDWALL: Glyph = 9;
pub const S_TLWALL: Glyph = 10;
pub const S_TRWALL: Glyph = 11;
pub const S_NDOOR: Glyph = 12;
pub const S_VODOOR: Glyph = 13;
pub const S_HODOOR: Glyph = 14;
pub const S_VCDOOR: Glyph = 15;
pub const S_HCDOOR: Glyph = 16;
pub const S_BARS: Glyph = 17;
pub const S_TREE: Glyph = 18;
pub const S_ROOM: Glyph = 19;
pub const S_DARKROOM: Glyph = 20;
pub const S_CORR: Glyph = 21;
pub const S_LITCORR: Glyph = 22;
pub const S_UPSTAIR: Glyph = 23;
pub const S_DNSTAIR: Glyph = 24;

/// Glyph of a map symbol
pub const fn cmap_to_glyph(sym: Glyph) -> Glyph {
    sym + GLYPH_CMAP_OFF
}

/// Glyph of a hostile monster by monster index
pub const fn mon_to_glyph(mon: Glyph) -> Glyph {
    mon + GLYPH_MON_OFF
}

/// Glyph of a tame monster by monster index
pub const fn pet_to_glyph(mon: Glyph) -> Glyph {
    mon + GLYPH_PET_OFF
}

/// Display character of the agent itself
pub const AGENT_CHAR: u8 = b'@';
