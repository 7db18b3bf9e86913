/// Fingerprint reported for absent content.
pub const ABSENT_CONTENT_FINGERPRINT: i32 = -1;

// (5381 << 16) + 5381
const SEED: i32 = 352_654_597;
const LANE_MIX: i32 = 1_566_083_941;

/// Stable 32-bit fingerprint of `content`, used to spot response drift between runs.
///
/// Two multiplicative lanes consume alternating UTF-16 code units and are
/// folded together at the end, so the value does not depend on process,
/// platform or hasher seed. `None` maps to [`ABSENT_CONTENT_FINGERPRINT`].
/// This is a change detector, not a cryptographic hash.
#[must_use]
pub fn content_fingerprint(content: Option<&str>) -> i32 {
    let Some(content) = content else {
        return ABSENT_CONTENT_FINGERPRINT;
    };
    let mut lane_a = SEED;
    let mut lane_b = SEED;
    let mut units = content.encode_utf16();
    while let Some(unit) = units.next() {
        lane_a = step(lane_a, unit);
        let Some(next) = units.next() else {
            break;
        };
        lane_b = step(lane_b, next);
    }
    lane_a.wrapping_add(lane_b.wrapping_mul(LANE_MIX))
}

const fn step(lane: i32, unit: u16) -> i32 {
    lane.wrapping_shl(5).wrapping_add(lane) ^ (unit as i32)
}
