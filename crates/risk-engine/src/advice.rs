//! Static per-zone messaging and base recommendations
//!
//! These tables back the recommendation layer when no generator is wired in;
//! the engine itself only emits structured factors.

use crate::Zone;

/// Headline message for a zone
pub fn zone_message(zone: Zone) -> &'static str {
    match zone {
        Zone::Green => "You're in a Green Zone. Your current environment appears secure.",
        Zone::Yellow => {
            "You're in a Yellow Zone. This is a slightly elevated risk environment. \
             Stay aware of your surroundings and ensure your devices are locked when not in use."
        }
        Zone::Red => {
            "Warning: You are in a Red Zone. Your environment poses a significant \
             digital and physical security risk."
        }
    }
}

/// Baseline recommendations for a zone
pub fn base_recommendations(zone: Zone) -> &'static [&'static str] {
    match zone {
        Zone::Green => &[
            "Continue following good security practices.",
            "Keep your devices updated.",
            "Maintain awareness of your surroundings.",
        ],
        Zone::Yellow => &[
            "Enable device auto-lock with a short timeout.",
            "Avoid accessing sensitive accounts on public networks.",
            "Keep personal belongings secure and in sight.",
            "Consider using a VPN for added protection.",
        ],
        Zone::Red => &[
            "Enable your VPN immediately.",
            "Ensure 2-Factor Authentication is active on critical accounts.",
            "Avoid accessing sensitive information.",
            "Consider relocating to a more secure location.",
            "Keep all devices locked when not actively in use.",
        ],
    }
}
