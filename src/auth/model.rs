use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Portal roles carried in access tokens and used as approval roles of letter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Mahasiswa,
    Dosen,
    /// Head of a study program.
    Prodi,
    /// Dean's office.
    Dekan,
    AdminKeuangan,
    AdminPerpustakaan,
    AdminLaboratorium,
    /// General affairs staff.
    AdminUmum,
}

impl Role {
    /// Roles allowed to issue (commit) letter numbers.
    pub fn can_issue_numbers(self) -> bool {
        matches!(self, Role::Prodi | Role::Dekan | Role::AdminUmum)
    }

    /// Roles allowed to reset counters and edit letter types.
    pub fn can_administer_numbering(self) -> bool {
        matches!(self, Role::Dekan | Role::AdminUmum)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Mahasiswa => "mahasiswa",
            Role::Dosen => "dosen",
            Role::Prodi => "prodi",
            Role::Dekan => "dekan",
            Role::AdminKeuangan => "admin_keuangan",
            Role::AdminPerpustakaan => "admin_perpustakaan",
            Role::AdminLaboratorium => "admin_laboratorium",
            Role::AdminUmum => "admin_umum",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mahasiswa" => Ok(Role::Mahasiswa),
            "dosen" => Ok(Role::Dosen),
            "prodi" => Ok(Role::Prodi),
            "dekan" => Ok(Role::Dekan),
            "admin_keuangan" => Ok(Role::AdminKeuangan),
            "admin_perpustakaan" => Ok(Role::AdminPerpustakaan),
            "admin_laboratorium" => Ok(Role::AdminLaboratorium),
            "admin_umum" => Ok(Role::AdminUmum),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id in the portal
    pub username: String,
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
    pub token_type: String, // "access" or "refresh"
}
