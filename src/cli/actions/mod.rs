pub mod session;

use secrecy::SecretString;

use crate::session::Role;

#[derive(Debug)]
pub enum Action {
    Whoami,
    Login {
        role: Role,
        username_or_email: String,
        password: SecretString,
    },
    Signup {
        name: String,
        email: String,
        password: SecretString,
    },
    Logout,
    Forgot {
        email: String,
    },
    ResetPassword {
        token: String,
        password: SecretString,
    },
    VerifyEmail {
        token: String,
    },
}
