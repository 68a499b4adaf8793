mod tables;

pub use tables::{
    format_diameter_table, format_logs_table, format_stand_summary, format_statistics_table,
    print_diameter_table, print_logs_table, print_stand_summary, print_statistics_table,
};
