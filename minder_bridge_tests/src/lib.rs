#[cfg(test)]
mod mock_backend;

#[cfg(test)]
mod end_to_end;
#[cfg(test)]
mod timer_subscription;
