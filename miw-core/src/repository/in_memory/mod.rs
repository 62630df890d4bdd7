//! Process-local repositories. Each keeps all its tables behind a single mutex, which
//! makes every operation a unit of work.

mod credential;
mod status_list;
mod wallet;

#[cfg(test)]
mod test;

pub use credential::InMemoryCredentialRepository;
pub use status_list::InMemoryStatusListRepository;
pub use wallet::InMemoryWalletRepository;
