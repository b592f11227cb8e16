/*
 * Test utilities for gpiopanel
 *
 * Builders for fake sysfs GPIO trees rooted in a temporary directory, so
 * discovery, export and pin control can run without real hardware.
 */

#[cfg(test)]
pub mod test_utils {
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    use crate::app::App;
    use crate::pin::PinController;

    pub struct FakeGpioTree {
        dir: TempDir,
    }

    impl FakeGpioTree {
        /// Empty class directory with `export` and `unexport` files.
        pub fn new() -> Self {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("export"), "").unwrap();
            fs::write(dir.path().join("unexport"), "").unwrap();
            Self { dir }
        }

        pub fn root(&self) -> &Path {
            self.dir.path()
        }

        /// Exported pin with default attribute contents.
        pub fn add_pin(&self, number: u32, label: Option<&str>) -> PathBuf {
            let pin = self.add_bare_pin(number);
            fs::write(pin.join("direction"), "in\n").unwrap();
            fs::write(pin.join("value"), "0\n").unwrap();
            fs::write(pin.join("active_low"), "0\n").unwrap();
            fs::write(pin.join("edge"), "none\n").unwrap();
            if let Some(l) = label {
                fs::write(pin.join("label"), format!("{}\n", l)).unwrap();
            }
            pin
        }

        /// Exported pin directory without any attribute files.
        pub fn add_bare_pin(&self, number: u32) -> PathBuf {
            let pin = self.root().join(format!("gpio{}", number));
            fs::create_dir_all(&pin).unwrap();
            pin
        }

        /// `gpiochip<base>` entry pointing at device `gpiochip<index>`.
        pub fn add_chip(&self, index: u32, base: u32, ngpio: u32) -> PathBuf {
            let chip = self.root().join(format!("gpiochip{}", base));
            fs::create_dir_all(chip.join("device").join(format!("gpiochip{}", index))).unwrap();
            fs::write(chip.join("base"), format!("{}\n", base)).unwrap();
            fs::write(chip.join("ngpio"), format!("{}\n", ngpio)).unwrap();
            fs::write(chip.join("label"), format!("gpio-chip-{}\n", index)).unwrap();
            chip
        }

        /// Controller directories under `devices/`, e.g. "dwapb.gpio/gpiochip0".
        pub fn add_bank(&self, nodes: &[&str]) {
            for node in nodes {
                fs::create_dir_all(self.root().join("devices").join(node)).unwrap();
            }
        }

        /// `gpiochip<base>` whose `device` is a symlink to `devices/<target>`.
        pub fn add_linked_chip(&self, base: u32, target: &str) -> PathBuf {
            let chip = self.root().join(format!("gpiochip{}", base));
            let dest = self.root().join("devices").join(target);
            fs::create_dir_all(&chip).unwrap();
            fs::create_dir_all(&dest).unwrap();
            std::os::unix::fs::symlink(&dest, chip.join("device")).unwrap();
            fs::write(chip.join("base"), format!("{}\n", base)).unwrap();
            chip
        }

        pub fn write_attr(&self, number: u32, attr: &str, text: &str) {
            fs::write(self.root().join(format!("gpio{}", number)).join(attr), text).unwrap();
        }

        pub fn read_attr(&self, number: u32, attr: &str) -> String {
            fs::read_to_string(self.root().join(format!("gpio{}", number)).join(attr))
                .unwrap()
                .trim()
                .to_string()
        }

        /// Everything written to the export file so far.
        pub fn export_requests(&self) -> String {
            fs::read_to_string(self.root().join("export")).unwrap()
        }
    }

    /// Exported pins `numbers`, each labelled `P9.<n>`, wrapped in an App.
    pub fn create_mock_app(tree: &FakeGpioTree, numbers: &[u32]) -> App {
        let pins = numbers
            .iter()
            .map(|n| {
                let label = format!("P9.{}", n);
                tree.add_pin(*n, Some(&label));
                PinController::new(*n, label, tree.root())
            })
            .collect();
        App::from_pins(pins)
    }
}
