use std::fmt;

/// A graphical environment which may be installed on top of the base system.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DesktopEnvironment {
    Gnome,
    Plasma,
    Xfce,
    Cosmic,
    Mate,
    Cinnamon,
    Lxqt,
    None,
}

impl DesktopEnvironment {
    /// Every selectable environment, in the order they are offered to the operator.
    pub const ALL: [DesktopEnvironment; 8] = [
        DesktopEnvironment::Gnome,
        DesktopEnvironment::Plasma,
        DesktopEnvironment::Xfce,
        DesktopEnvironment::Cosmic,
        DesktopEnvironment::Mate,
        DesktopEnvironment::Cinnamon,
        DesktopEnvironment::Lxqt,
        DesktopEnvironment::None,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DesktopEnvironment::Gnome => "GNOME",
            DesktopEnvironment::Plasma => "KDE Plasma",
            DesktopEnvironment::Xfce => "XFCE",
            DesktopEnvironment::Cosmic => "COSMIC",
            DesktopEnvironment::Mate => "MATE",
            DesktopEnvironment::Cinnamon => "Cinnamon",
            DesktopEnvironment::Lxqt => "LXQt",
            DesktopEnvironment::None => "None (console only)",
        }
    }

    /// Packages installed for this environment, in addition to `xorg`.
    pub fn packages(self) -> &'static [&'static str] {
        match self {
            DesktopEnvironment::Gnome => &["gnome", "gnome-shell"],
            DesktopEnvironment::Plasma => &["plasma", "kde-applications"],
            DesktopEnvironment::Xfce => &["xfce4", "xfce4-goodies", "lightdm", "lightdm-gtk-greeter"],
            DesktopEnvironment::Cosmic => &["cosmic-session", "cosmic-greeter"],
            DesktopEnvironment::Mate => &["mate", "mate-extra", "lightdm", "lightdm-gtk-greeter"],
            DesktopEnvironment::Cinnamon => &["cinnamon", "lightdm", "lightdm-gtk-greeter"],
            DesktopEnvironment::Lxqt => &["lxqt", "lightdm", "lightdm-gtk-greeter"],
            DesktopEnvironment::None => &[],
        }
    }

    /// The systemd unit of the display manager which starts the environment.
    pub fn display_manager(self) -> Option<&'static str> {
        match self {
            DesktopEnvironment::Gnome => Some("gdm"),
            DesktopEnvironment::Plasma => Some("sddm"),
            DesktopEnvironment::Cosmic => Some("cosmic-greeter"),
            DesktopEnvironment::Xfce
            | DesktopEnvironment::Mate
            | DesktopEnvironment::Cinnamon
            | DesktopEnvironment::Lxqt => Some("lightdm"),
            DesktopEnvironment::None => None,
        }
    }
}

impl Default for DesktopEnvironment {
    fn default() -> Self { DesktopEnvironment::None }
}

impl fmt::Display for DesktopEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str(self.name()) }
}
