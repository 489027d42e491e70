//! Size arithmetic shared by the packer and the compositor.

/// Largest size with the aspect ratio of `size` that fits inside `bounds`.
///
/// Never enlarges: a size already inside `bounds` is returned unchanged. When
/// shrinking, the constrained side takes the bound and the other side is the
/// floor or ceil of its exact value, whichever keeps the aspect ratio closer
/// (floor on ties), and never less than 1.
pub fn fit_within(size: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (w, h) = size;
    let (max_w, max_h) = (bounds.0.max(1), bounds.1.max(1));
    if w == 0 || h == 0 || (max_w >= w && max_h >= h) {
        return size;
    }
    let aspect = w as f64 / h as f64;
    let (bw, bh) = (max_w as f64, max_h as f64);
    if bw / bh >= aspect {
        let nw = round_aspect(bh * aspect, |n| (aspect - n / bh).abs());
        (nw, max_h)
    } else {
        let nh = round_aspect(bw / aspect, |n| {
            if n == 0.0 { 0.0 } else { (aspect - bw / n).abs() }
        });
        (max_w, nh)
    }
}

fn round_aspect(exact: f64, error: impl Fn(f64) -> f64) -> u32 {
    let lo = exact.floor();
    let hi = exact.ceil();
    let pick = if error(hi) < error(lo) { hi } else { lo };
    (pick as u32).max(1)
}

/// Scales `size` by `k`, truncating each side.
pub fn scale(size: (u32, u32), k: f64) -> (u32, u32) {
    ((size.0 as f64 * k) as u32, (size.1 as f64 * k) as u32)
}
