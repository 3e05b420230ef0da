extern crate archinst;
extern crate clap;
extern crate crossterm;
extern crate failure;
extern crate libc;
#[macro_use]
extern crate log;
extern crate pbr;

mod errors;
mod prompt;

use archinst::{
    chroot::{Executor, SystemExecutor},
    disk::{self, BlockDisk},
    network, BootloaderChoice, DesktopEnvironment, DiskLayout, Firmware, InstallConfig, Installer,
    Partitions, Password, Step, SystemSettings, UserAccount, KILL_SWITCH,
};
use clap::App;
use log::LevelFilter;
use pbr::ProgressBar;

use self::errors::ArchinstError;

use std::{
    cell::RefCell,
    fmt, io,
    path::{Path, PathBuf},
    process::exit,
    rc::Rc,
    sync::atomic::Ordering,
};

#[derive(Copy, Clone, Debug, PartialEq)]
enum NetworkChoice {
    Wired,
    Wireless,
    Skip,
}

impl fmt::Display for NetworkChoice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            NetworkChoice::Wired => "Wired (DHCP)",
            NetworkChoice::Wireless => "Wi-Fi (iwctl)",
            NetworkChoice::Skip => "Skip",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum LayoutChoice {
    Automatic,
    AutomaticSwap,
    Manual,
}

impl fmt::Display for LayoutChoice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            LayoutChoice::Automatic => "Automatic: /boot (512MB, UEFI only) + / (rest)",
            LayoutChoice::AutomaticSwap => {
                "Automatic with swap: /boot (512MB, UEFI only) + swap (2GB) + / (rest)"
            }
            LayoutChoice::Manual => "Manual partitioning with cfdisk",
        })
    }
}

fn main() {
    App::new("archinst")
        .about("Installs Arch Linux onto a disk from the live environment")
        .version(env!("CARGO_PKG_VERSION"))
        .get_matches();

    if let Err(err) = archinst::log(LevelFilter::Warn) {
        eprintln!("Failed to initialize logging: {}", err);
    }

    configure_signal_handling(abort_handler);

    let mut exec = SystemExecutor;
    let config = match gather(&mut exec) {
        Ok(config) => config,
        Err(why) => {
            eprintln!("archinst: {}", why);
            exit(1);
        }
    };

    let pb_opt: Rc<RefCell<Option<ProgressBar<io::Stdout>>>> = Rc::new(RefCell::new(None));

    let res = {
        let mut installer = Installer::default();

        {
            let pb_opt = pb_opt.clone();
            installer.on_error(move |error| {
                if let Some(mut pb) = pb_opt.borrow_mut().take() {
                    pb.finish_println("");
                }

                eprintln!("Error: {}", error);
            });
        }

        {
            let pb_opt = pb_opt.clone();
            let mut step_opt = None;
            installer.on_status(move |status| {
                if step_opt != Some(status.step) {
                    if let Some(mut pb) = pb_opt.borrow_mut().take() {
                        pb.finish_println("");
                    }

                    step_opt = Some(status.step);

                    let mut pb = ProgressBar::new(100);
                    pb.show_speed = false;
                    pb.show_counter = false;
                    pb.message(match status.step {
                        Step::Partition => "Partitioning disk ",
                        Step::Format => "Formatting partitions ",
                        Step::Mount => "Mounting partitions ",
                        Step::Bootstrap => "Installing base system ",
                        Step::Desktop => "Installing desktop ",
                        Step::Configure => "Configuring installation ",
                        Step::Unmount => "Unmounting ",
                    });
                    *pb_opt.borrow_mut() = Some(pb);
                }

                if let Some(ref mut pb) = *pb_opt.borrow_mut() {
                    pb.set(status.percent as u64);
                }
            });
        }

        configure_signal_handling(kill_switch_handler);
        installer.install(&mut exec, &config)
    };

    if let Some(mut pb) = pb_opt.borrow_mut().take() {
        pb.finish_println("");
    }

    let status = match res {
        Ok(()) => {
            println!("install was successful. Remove the installation media and reboot.");
            0
        }
        Err(err) => {
            println!("install failed: {}", err);
            1
        }
    };

    exit(status);
}

/// Walks the operator through every choice, before anything is written to disk.
fn gather<E: Executor>(exec: &mut E) -> Result<InstallConfig, ArchinstError> {
    let firmware = Firmware::detect();
    println!("Detected firmware: {}", firmware);

    configure_network(exec)?;

    let disk = select_disk()?;
    let layout = select_layout(exec, &disk, firmware)?;

    let desktop = prompt::choice(
        "Select a desktop environment:",
        &DesktopEnvironment::ALL,
        DesktopEnvironment::ALL.len() - 1,
    )?;

    let hostname = prompt::line_or("Hostname [archlinux]: ", "archlinux")?;
    let username = prompt::line("Username: ")?;
    let password = prompt::password("Password: ")?;

    let bootloader = if firmware.is_uefi() {
        prompt::choice("Select a bootloader:", &BootloaderChoice::ALL, 0)?
    } else {
        BootloaderChoice::Grub
    };

    let config = InstallConfig {
        firmware,
        disk,
        layout,
        desktop,
        bootloader,
        hostname,
        account: UserAccount { username, password: Password::new(password) },
        system: SystemSettings::default(),
    };

    config.validate()?;
    Ok(config)
}

fn configure_network<E: Executor>(exec: &mut E) -> Result<(), ArchinstError> {
    if network::is_online(exec) {
        println!("Internet connection detected.");
        return Ok(());
    }

    let options = [NetworkChoice::Wired, NetworkChoice::Wireless, NetworkChoice::Skip];
    match prompt::choice("No internet connection. Configure the network:", &options, 0)? {
        NetworkChoice::Wired => network::dhcp(exec)?,
        NetworkChoice::Wireless => {
            print!("{}", network::wifi_devices(exec)?);
            let device = prompt::line_or("Wireless device [wlan0]: ", "wlan0")?;
            print!("{}", network::wifi_scan(exec, &device)?);
            let ssid = prompt::line("Network name: ")?;
            let passphrase = prompt::password("Passphrase (leave empty for open networks): ")?;
            network::wifi_connect(exec, &device, &ssid, Some(&passphrase))?;
        }
        NetworkChoice::Skip => return Err(ArchinstError::NetworkSkipped),
    }

    if network::is_online(exec) {
        println!("Internet connection established.");
        Ok(())
    } else {
        Err(ArchinstError::NetworkUnavailable)
    }
}

fn select_disk() -> Result<PathBuf, ArchinstError> {
    let disks: Vec<BlockDisk> = disk::list_disks()?;
    println!("Available disks:");
    for disk in &disks {
        println!("  {}", disk);
    }

    let choice = prompt::line("Disk to install to (e.g. sda): ")?;
    disk::validate_disk(&choice, &disks).map_err(|why| ArchinstError::InvalidDisk { why })
}

fn select_layout<E: Executor>(
    exec: &mut E,
    disk: &Path,
    firmware: Firmware,
) -> Result<DiskLayout, ArchinstError> {
    let options = [LayoutChoice::Automatic, LayoutChoice::AutomaticSwap, LayoutChoice::Manual];
    println!("WARNING: all data on {} will be erased.", disk.display());

    match prompt::choice("Select a partitioning option:", &options, 0)? {
        LayoutChoice::Automatic => Ok(DiskLayout::Automatic { swap: false }),
        LayoutChoice::AutomaticSwap => Ok(DiskLayout::Automatic { swap: true }),
        LayoutChoice::Manual => {
            disk::cfdisk(exec, disk)?;
            let hint = if firmware.is_uefi() {
                "Partitions, in order: efi [swap] root: "
            } else {
                "Partitions, in order: [swap] root: "
            };

            let input = prompt::line(hint)?;
            let partitions = Partitions::parse_manual(&input, firmware)?;
            info!("manual layout with {} partitions", partitions.len());
            Ok(DiskLayout::Manual(input.split_whitespace().map(String::from).collect()))
        }
    }
}

/// While prompting, an interrupt ends the program immediately, as nothing has been changed.
extern "C" fn abort_handler(signal: i32) {
    if signal == libc::SIGINT {
        const MESSAGE: &[u8] = b"\ninstallation aborted by user\n";
        unsafe {
            libc::write(libc::STDERR_FILENO, MESSAGE.as_ptr() as *const libc::c_void, MESSAGE.len());
            libc::_exit(1);
        }
    }
}

/// Once installing, an interrupt stops the installer at the next step boundary.
extern "C" fn kill_switch_handler(signal: i32) {
    if signal == libc::SIGINT {
        KILL_SWITCH.store(true, Ordering::SeqCst);
    }
}

fn configure_signal_handling(handler: extern "C" fn(i32)) {
    if unsafe { libc::signal(libc::SIGINT, handler as libc::sighandler_t) == libc::SIG_ERR } {
        eprintln!("archinst: signal handling error: {}", io::Error::last_os_error());
        exit(1);
    }
}
