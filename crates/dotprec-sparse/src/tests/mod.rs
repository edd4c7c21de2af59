mod proptest_dot;
