//! Output path templates handed to the fetch tool.

use std::path::Path;

use crate::naming::NameToken;

/// Destination template for one job: `<dir>/%(id)s.<token>.%(ext)s`.
///
/// `%(id)s` and `%(ext)s` are expanded by the fetch tool; the token keeps two
/// jobs from ever sharing a destination, even for identical source ids.
pub fn output_template(output_dir: &Path, token: NameToken) -> String {
    let file = format!("%(id)s.{}.%(ext)s", token);
    output_dir.join(file).to_string_lossy().into_owned()
}
