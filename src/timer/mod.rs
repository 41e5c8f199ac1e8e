/*!
 * Timer Module
 * Alarm timer collaborator raising SIGALRM through the APC queue
 */

mod alarm;

pub use alarm::IntervalTimer;
