// packages.rs — Docker Engine installation from the vendor repository.
//
// The distribution's own docker package is never used. For each supported
// package manager we register download.docker.com as a repository and
// install the engine plus the compose plugin from there.

use std::path::Path;

use jmp_config::EnvFile;

use crate::error::StackError;
use crate::runner::CommandSpec;

const DOCKER_REPO: &str = "https://download.docker.com/linux";
const DOCKER_PACKAGES: &[&str] = &[
    "docker-ce",
    "docker-ce-cli",
    "containerd.io",
    "docker-buildx-plugin",
    "docker-compose-plugin",
];

/// Host package managers this tool knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Apt,
    /// dnf5 (Fedora 41 and later); its config-manager syntax differs.
    Dnf5,
    Dnf,
    Yum,
}

impl PackageManager {
    /// First of apt, dnf5, dnf, yum for which `has_program` answers true.
    pub fn detect_with(has_program: impl Fn(&str) -> bool) -> Option<Self> {
        [
            PackageManager::Apt,
            PackageManager::Dnf5,
            PackageManager::Dnf,
            PackageManager::Yum,
        ]
        .into_iter()
        .find(|pm| has_program(pm.binary()))
    }

    pub fn binary(&self) -> &'static str {
        match self {
            PackageManager::Apt => "apt-get",
            PackageManager::Dnf5 => "dnf5",
            PackageManager::Dnf => "dnf",
            PackageManager::Yum => "yum",
        }
    }
}

/// The fields of /etc/os-release that select a vendor repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsRelease {
    pub id: String,
    pub id_like: Vec<String>,
    pub version_codename: Option<String>,
    pub ubuntu_codename: Option<String>,
}

impl OsRelease {
    pub fn parse(content: &str) -> Self {
        let env = EnvFile::parse(content);
        let non_empty = |key: &str| env.get(key).filter(|v| !v.is_empty()).map(str::to_string);
        Self {
            id: non_empty("ID").unwrap_or_default().to_ascii_lowercase(),
            id_like: env
                .get("ID_LIKE")
                .map(|v| v.split_whitespace().map(str::to_ascii_lowercase).collect())
                .unwrap_or_default(),
            version_codename: non_empty("VERSION_CODENAME"),
            ubuntu_codename: non_empty("UBUNTU_CODENAME"),
        }
    }

    /// Read os-release from `path`; a missing file yields an empty record.
    pub fn load(path: &Path) -> Result<Self, StackError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(StackError::io(path, source)),
        }
    }

    fn is_like(&self, name: &str) -> bool {
        self.id == name || self.id_like.iter().any(|l| l == name)
    }

    /// Directory under download.docker.com/linux for this host.
    pub fn repo_distro(&self, pm: PackageManager) -> Result<&'static str, StackError> {
        match pm {
            PackageManager::Apt if self.is_like("ubuntu") => Ok("ubuntu"),
            PackageManager::Apt if self.is_like("debian") => Ok("debian"),
            PackageManager::Apt => Err(StackError::UnsupportedDistribution(self.describe())),
            PackageManager::Dnf | PackageManager::Dnf5 if self.id == "fedora" => Ok("fedora"),
            PackageManager::Dnf | PackageManager::Dnf5 | PackageManager::Yum if self.id == "rhel" => {
                Ok("rhel")
            }
            PackageManager::Dnf | PackageManager::Dnf5 | PackageManager::Yum => Ok("centos"),
        }
    }

    /// Release codename for apt sources (derivatives report the Ubuntu one).
    pub fn apt_codename(&self) -> Option<&str> {
        self.ubuntu_codename
            .as_deref()
            .filter(|_| self.id != "debian")
            .or(self.version_codename.as_deref())
    }

    fn describe(&self) -> String {
        if self.id.is_empty() {
            "unknown".to_string()
        } else {
            self.id.clone()
        }
    }
}

/// Commands that install Docker Engine and compose from the vendor repo.
pub fn docker_install_plan(pm: PackageManager, os: &OsRelease) -> Result<Vec<CommandSpec>, StackError> {
    let distro = os.repo_distro(pm)?;
    let repo = format!("{}/{}", DOCKER_REPO, distro);

    let plan = match pm {
        PackageManager::Apt => {
            let codename = os
                .apt_codename()
                .ok_or_else(|| StackError::UnsupportedDistribution(format!("{} (no codename)", os.describe())))?;
            let source_line = format!(
                "echo \"deb [arch=$(dpkg --print-architecture) signed-by=/etc/apt/keyrings/docker.asc] {} {} stable\" > /etc/apt/sources.list.d/docker.list",
                repo, codename
            );
            vec![
                CommandSpec::new("apt-get").arg("update"),
                CommandSpec::new("apt-get").args(["install", "-y", "ca-certificates", "curl"]),
                CommandSpec::new("install").args(["-m", "0755", "-d", "/etc/apt/keyrings"]),
                CommandSpec::new("curl").args([
                    "-fsSL".to_string(),
                    format!("{}/gpg", repo),
                    "-o".to_string(),
                    "/etc/apt/keyrings/docker.asc".to_string(),
                ]),
                CommandSpec::new("chmod").args(["a+r", "/etc/apt/keyrings/docker.asc"]),
                CommandSpec::new("sh").args(["-c".to_string(), source_line]),
                CommandSpec::new("apt-get").arg("update"),
                CommandSpec::new("apt-get")
                    .args(["install", "-y"])
                    .args(DOCKER_PACKAGES.iter().copied()),
            ]
        }
        PackageManager::Dnf => vec![
            CommandSpec::new("dnf").args(["-y", "install", "dnf-plugins-core"]),
            CommandSpec::new("dnf").args([
                "config-manager".to_string(),
                "--add-repo".to_string(),
                format!("{}/docker-ce.repo", repo),
            ]),
            CommandSpec::new("dnf")
                .args(["-y", "install"])
                .args(DOCKER_PACKAGES.iter().copied()),
        ],
        PackageManager::Dnf5 => vec![
            CommandSpec::new("dnf5").args(["-y", "install", "dnf5-plugins"]),
            CommandSpec::new("dnf5").args([
                "config-manager".to_string(),
                "addrepo".to_string(),
                format!("--from-repofile={}/docker-ce.repo", repo),
            ]),
            CommandSpec::new("dnf5")
                .args(["-y", "install"])
                .args(DOCKER_PACKAGES.iter().copied()),
        ],
        PackageManager::Yum => vec![
            CommandSpec::new("yum").args(["install", "-y", "yum-utils"]),
            CommandSpec::new("yum-config-manager").args([
                "--add-repo".to_string(),
                format!("{}/docker-ce.repo", repo),
            ]),
            CommandSpec::new("yum")
                .args(["install", "-y"])
                .args(DOCKER_PACKAGES.iter().copied()),
        ],
    };
    Ok(plan)
}
