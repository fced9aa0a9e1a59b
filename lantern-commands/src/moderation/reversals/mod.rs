pub mod unban;
pub mod unlock;
pub mod untimeout;
