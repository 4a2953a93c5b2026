mod concurrency;
mod end_to_end;
mod fallback;
mod resume;
