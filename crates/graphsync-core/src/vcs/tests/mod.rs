mod tests_git;
